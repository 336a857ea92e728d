mod tests {
    use track_light_composer::{
        DebounceConfig, EventQueue, GameController, Grid, OcclusionEvent, Pixel, SensorRegistry,
        SparkField, SparkPhysics, Track, TrackLayout, TrackTimer,
    };

    const TRACK_HEIGHTS: [usize; 5] = [60, 60, 60, 59, 60];
    const FPS: u32 = 100;

    type TrackGrid = Grid<5, 300>;

    fn event(sensor: u8, start: u32) -> OcclusionEvent {
        OcclusionEvent {
            sensor,
            start,
            end: start + 4_000,
        }
    }

    fn setup() -> (TrackGrid, SparkField<16>) {
        (
            TrackGrid::new(&TRACK_HEIGHTS).unwrap(),
            SparkField::new(SparkPhysics::default()),
        )
    }

    fn timer() -> TrackTimer {
        TrackTimer::new(TrackLayout::default(), FPS, 7)
    }

    fn all_pixels(grid: &mut TrackGrid, expected: Pixel) -> bool {
        grid.flatten().iter().all(|pixel| *pixel == expected)
    }

    #[test]
    fn test_default_layout() {
        let layout = TrackLayout::default();
        assert_eq!(layout.pins(), [10, 12, 11, 13]);
        let beam = layout.beam(13).unwrap();
        assert_eq!(beam.track, Track::Two);
        assert_eq!(layout.flash(beam), Pixel::new(0.8, 1.0, 0.5));
        assert!(layout.beam(14).is_none());
    }

    #[test]
    fn test_start_beam_records_time_and_flashes() {
        let queue: EventQueue<OcclusionEvent, 8> = EventQueue::new();
        let mut game = GameController::new(queue.consumer().unwrap(), timer());
        let (mut grid, mut sparks) = setup();

        queue.try_send(event(10, 1_000)).unwrap();
        let report = game.tick(&mut grid, &mut sparks);

        assert_eq!(report.events, 1);
        assert_eq!(report.crossings, 0);
        assert_eq!(game.timer().start_time(Track::One), Some(1_000));
        assert_eq!(game.timer().start_time(Track::Two), None);
        assert!(all_pixels(&mut grid, Pixel::new(0.3, 1.0, 0.5)));
    }

    #[test]
    fn test_end_beam_completes_crossing() {
        let queue: EventQueue<OcclusionEvent, 8> = EventQueue::new();
        let mut game = GameController::new(queue.consumer().unwrap(), timer());
        let (mut grid, mut sparks) = setup();

        queue.try_send(event(11, 2_000)).unwrap();
        queue.try_send(event(13, 1_502_000)).unwrap();
        let report = game.tick(&mut grid, &mut sparks);

        assert_eq!(report.events, 2);
        assert_eq!(report.crossings, 1);
        let crossing = game.timer().last_crossing(Track::Two).unwrap();
        assert_eq!(crossing.elapsed_us(), 1_500_000);
        assert_eq!(game.timer().start_time(Track::Two), None);
        assert!(game.timer().last_crossing(Track::One).is_none());

        // Last event in the tick wins the flash
        assert!(all_pixels(&mut grid, Pixel::new(0.8, 1.0, 0.5)));

        // One celebration spark per column, live after the next commit
        assert!(sparks.is_empty());
        sparks.commit();
        assert_eq!(sparks.len(), 5);
    }

    #[test]
    fn test_one_controller_sees_whole_run() {
        let queue: EventQueue<OcclusionEvent, 8> = EventQueue::new();
        let mut game = GameController::new(queue.consumer().unwrap(), timer());
        assert!(queue.consumer().is_none());
        let (mut grid, mut sparks) = setup();

        queue.try_send(event(10, 0)).unwrap();
        game.tick(&mut grid, &mut sparks);
        queue.try_send(event(12, 900_000)).unwrap();
        let report = game.tick(&mut grid, &mut sparks);

        assert_eq!(report.crossings, 1);
        let crossing = game.timer().last_crossing(Track::One).unwrap();
        assert_eq!(crossing.started, 0);
        assert_eq!(crossing.elapsed_us(), 900_000);
    }

    #[test]
    fn test_end_without_start_only_flashes() {
        let queue: EventQueue<OcclusionEvent, 8> = EventQueue::new();
        let mut game = GameController::new(queue.consumer().unwrap(), timer());
        let (mut grid, mut sparks) = setup();

        queue.try_send(event(12, 5_000)).unwrap();
        let report = game.tick(&mut grid, &mut sparks);

        assert_eq!(report.crossings, 0);
        assert!(game.timer().last_crossing(Track::One).is_none());
        assert!(all_pixels(&mut grid, Pixel::new(0.0, 1.0, 0.5)));
        sparks.commit();
        assert!(sparks.is_empty());
    }

    #[test]
    fn test_unknown_beam_is_ignored() {
        let queue: EventQueue<OcclusionEvent, 8> = EventQueue::new();
        let mut game = GameController::new(queue.consumer().unwrap(), timer());
        let (mut grid, mut sparks) = setup();

        queue.try_send(event(3, 5_000)).unwrap();
        let report = game.tick(&mut grid, &mut sparks);

        assert_eq!(report.events, 1);
        assert_eq!(report.ignored, 1);
        assert!(all_pixels(&mut grid, Pixel::OFF));
    }

    #[test]
    fn test_celebration_can_be_disabled() {
        let queue: EventQueue<OcclusionEvent, 8> = EventQueue::new();
        let layout = TrackLayout {
            celebrate: false,
            ..TrackLayout::default()
        };
        let mut game = GameController::new(queue.consumer().unwrap(), TrackTimer::new(layout, FPS, 7));
        let (mut grid, mut sparks) = setup();

        queue.try_send(event(10, 0)).unwrap();
        queue.try_send(event(12, 900_000)).unwrap();
        assert_eq!(game.tick(&mut grid, &mut sparks).crossings, 1);
        sparks.commit();
        assert!(sparks.is_empty());
    }

    #[test]
    fn test_empty_tick() {
        let queue: EventQueue<OcclusionEvent, 8> = EventQueue::new();
        let mut game = GameController::new(queue.consumer().unwrap(), timer());
        let (mut grid, mut sparks) = setup();
        let report = game.tick(&mut grid, &mut sparks);
        assert_eq!(report.events, 0);
        assert_eq!(game.dropped(), 0);
    }

    #[test]
    fn test_edges_to_crossing() {
        let queue: EventQueue<OcclusionEvent, 8> = EventQueue::new();
        let producer = queue.producer();
        let layout = TrackLayout::default();
        let mut registry: SensorRegistry<'_, 4> = SensorRegistry::new(DebounceConfig::default());
        for pin in layout.pins() {
            registry.add(pin).unwrap();
        }
        registry.set_listener(&producer);

        let mut game = GameController::new(queue.consumer().unwrap(), TrackTimer::new(layout, FPS, 1));
        let (mut grid, mut sparks) = setup();

        // Car passes the start beam with some flicker
        registry.on_fall(10, 100_000);
        registry.on_rise(10, 100_400);
        registry.on_fall(10, 100_600);
        registry.on_rise(10, 108_000);
        game.tick(&mut grid, &mut sparks);
        assert_eq!(game.timer().start_time(Track::One), Some(100_000));

        // ... and the end beam two seconds later
        registry.on_fall(12, 2_100_000);
        registry.on_rise(12, 2_106_000);
        game.tick(&mut grid, &mut sparks);
        let crossing = game.timer().last_crossing(Track::One).unwrap();
        assert_eq!(crossing.started, 100_000);
        assert_eq!(crossing.finished, 2_100_000);
        assert_eq!(crossing.elapsed_us(), 2_000_000);
    }
}
