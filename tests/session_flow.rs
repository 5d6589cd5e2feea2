//! End-to-end session scenarios: open a document, read it with gestures,
//! and verify positions land on disk.

use std::time::{Duration, Instant};

use folio::{
    Bitmap, CancelToken, DocumentSource, FrameEvent, GestureIntent, JsonPositionStore, PageSize,
    Point, PointerEvent, PointerPhase, PositionStore, ReadingPosition, ReadingSession,
    RenderFault, Settings, Viewport,
};

/// White pages with a black block in the middle, so the crop pipeline has
/// content to find.
struct StampedPages {
    count: usize,
    delay: Duration,
}

impl DocumentSource for StampedPages {
    fn page_count(&self) -> usize {
        self.count
    }

    fn page_size(&self, _page: usize) -> Result<PageSize, RenderFault> {
        Ok(PageSize::new(200.0, 280.0))
    }

    fn render_page(
        &self,
        page: usize,
        scale: f32,
        cancel: &CancelToken,
    ) -> Result<Bitmap, RenderFault> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        if cancel.is_canceled() {
            return Err(RenderFault::Canceled);
        }

        let width = (200.0 * scale).round() as u32;
        let height = (280.0 * scale).round() as u32;
        let mut bmp = Bitmap::filled(width, height, (255, 255, 255), scale);
        for y in (60.0 * scale) as u32..(220.0 * scale) as u32 {
            for x in (40.0 * scale) as u32..(160.0 * scale) as u32 {
                bmp.set_pixel(x, y, (page as u8, 0, 0));
            }
        }
        Ok(bmp)
    }
}

fn drain_frames<P: PositionStore>(session: &mut ReadingSession<P>) -> Vec<FrameEvent> {
    let mut events = Vec::new();
    for _ in 0..400 {
        events.extend(session.poll_frames());
        if !events.is_empty() {
            // One more pass to pick up stragglers
            std::thread::sleep(Duration::from_millis(10));
            events.extend(session.poll_frames());
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    events
}

fn swipe_left<P: PositionStore>(session: &mut ReadingSession<P>, at: Instant) {
    session.handle_pointer(PointerEvent {
        contact: 1,
        phase: PointerPhase::Down,
        pos: Point::new(500.0, 400.0),
        at,
    });
    session.handle_pointer(PointerEvent {
        contact: 1,
        phase: PointerPhase::Up,
        pos: Point::new(350.0, 410.0),
        at: at + Duration::from_millis(120),
    });
}

#[test]
fn raster_session_renders_cropped_frames() {
    let mut session = ReadingSession::open_raster(
        "/books/stamped.pdf",
        StampedPages {
            count: 5,
            delay: Duration::ZERO,
        },
        Viewport::new(600.0, 800.0),
        2.0,
        Settings::default(),
        JsonPositionStore::ephemeral(),
    )
    .expect("opens");

    let events = drain_frames(&mut session);
    let frame = events
        .iter()
        .find_map(|e| match e {
            FrameEvent::Applied(frame) => Some(frame),
            FrameEvent::Failed(_) => None,
        })
        .expect("a frame was applied");

    assert_eq!(frame.page, 0);
    assert!(frame.cropped, "content bounds were detected and cropped");
    // Backing bitmap is denser than the display size (dpr 2.0, quality 1.5)
    assert!(frame.bitmap.width as f32 > frame.display_width);

    session.close().expect("close");
}

#[test]
fn swipes_advance_pages_and_position_is_saved_once_stable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("positions.json");
    let path_str = path.to_str().expect("utf8 path").to_string();

    let mut session = ReadingSession::open_raster(
        "/books/stamped.pdf",
        StampedPages {
            count: 5,
            delay: Duration::ZERO,
        },
        Viewport::new(600.0, 800.0),
        1.0,
        Settings::default(),
        JsonPositionStore::with_file(&path_str),
    )
    .expect("opens");

    let t0 = Instant::now();
    swipe_left(&mut session, t0);
    swipe_left(&mut session, t0 + Duration::from_millis(200));
    assert_eq!(session.current_page(), 2);

    // Inside the debounce window nothing is written yet.
    session.tick(t0 + Duration::from_millis(500));
    assert!(
        JsonPositionStore::load_from_file(&path_str)
            .expect("load")
            .get("/books/stamped.pdf")
            .is_none()
    );

    // Once the position has been stable long enough, it lands on disk.
    session.tick(t0 + Duration::from_millis(900));
    let saved = JsonPositionStore::load_from_file(&path_str)
        .expect("load")
        .get("/books/stamped.pdf")
        .expect("saved");
    assert_eq!(saved.current_page, 2);
    assert_eq!(saved.total_pages, 5);

    session.close().expect("close");
}

#[test]
fn close_persists_without_waiting_for_debounce() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("positions.json");
    let path_str = path.to_str().expect("utf8 path").to_string();

    let mut session = ReadingSession::open_raster(
        "/books/stamped.pdf",
        StampedPages {
            count: 5,
            delay: Duration::ZERO,
        },
        Viewport::new(600.0, 800.0),
        1.0,
        Settings::default(),
        JsonPositionStore::with_file(&path_str),
    )
    .expect("opens");

    session.go_to_page(4, Instant::now());
    session.close().expect("close");

    let saved = JsonPositionStore::load_from_file(&path_str)
        .expect("load")
        .get("/books/stamped.pdf")
        .expect("saved");
    assert_eq!(saved.current_page, 4);
}

#[test]
fn reopening_resumes_at_saved_page() {
    let mut store = JsonPositionStore::ephemeral();
    store.update("/books/stamped.pdf", ReadingPosition::at_page(3, 5));

    let session = ReadingSession::open_raster(
        "/books/stamped.pdf",
        StampedPages {
            count: 5,
            delay: Duration::ZERO,
        },
        Viewport::new(600.0, 800.0),
        1.0,
        Settings::default(),
        store,
    )
    .expect("opens");

    assert_eq!(session.current_page(), 3);
    assert!((session.position().progress - 4.0 / 5.0).abs() < 1e-6);
}

#[test]
fn rapid_page_turns_apply_only_the_last_frame() {
    let mut session = ReadingSession::open_raster(
        "/books/stamped.pdf",
        StampedPages {
            count: 5,
            delay: Duration::from_millis(25),
        },
        Viewport::new(600.0, 800.0),
        1.0,
        Settings::default(),
        JsonPositionStore::ephemeral(),
    )
    .expect("opens");

    // Three quick turns; earlier renders are superseded in flight.
    let t0 = Instant::now();
    session.go_to_page(1, t0);
    session.go_to_page(2, t0);
    session.go_to_page(3, t0);

    let mut applied = Vec::new();
    for _ in 0..400 {
        for event in session.poll_frames() {
            if let FrameEvent::Applied(frame) = event {
                applied.push(frame.page);
            }
        }
        if applied.contains(&3) {
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }

    assert_eq!(applied, vec![3], "superseded renders never applied");
    session.close().expect("close");
}

#[test]
fn pinch_zoom_commits_into_render_state() {
    let mut session = ReadingSession::open_raster(
        "/books/stamped.pdf",
        StampedPages {
            count: 5,
            delay: Duration::ZERO,
        },
        Viewport::new(600.0, 800.0),
        1.0,
        Settings::default(),
        JsonPositionStore::ephemeral(),
    )
    .expect("opens");

    let t0 = Instant::now();
    session.apply_intent(GestureIntent::ZoomCommit { scale: 2.0 }, t0);

    let state = session.render_state().expect("raster session");
    assert!(state.zoom_override);
    assert!((state.display_scale - 2.0).abs() < 1e-6);

    session.reset_zoom();
    let state = session.render_state().expect("raster session");
    assert!(!state.zoom_override);
    assert!((state.display_scale - 1.0).abs() < 1e-6);
}
