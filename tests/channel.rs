mod tests {
    use track_light_composer::{EventListener, EventQueue, OcclusionEvent, TrySendError};

    fn event(sensor: u8, start: u32) -> OcclusionEvent {
        OcclusionEvent {
            sensor,
            start,
            end: start + 5_000,
        }
    }

    #[test]
    fn test_fifo_order() {
        let queue: EventQueue<u32, 4> = EventQueue::new();
        let producer = queue.producer();
        producer.try_send(1).unwrap();
        producer.try_send(2).unwrap();
        producer.try_send(3).unwrap();

        let consumer = queue.consumer().unwrap();
        assert_eq!(consumer.try_receive(), Some(1));
        assert_eq!(consumer.try_receive(), Some(2));
        assert_eq!(consumer.try_receive(), Some(3));
        assert_eq!(consumer.try_receive(), None);
    }

    #[test]
    fn test_full_queue_counts_drops() {
        let queue: EventQueue<u32, 2> = EventQueue::new();
        queue.try_send(1).unwrap();
        queue.try_send(2).unwrap();
        assert_eq!(queue.try_send(3), Err(TrySendError(3)));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.dropped(), 1);
        assert_eq!(queue.consumer().unwrap().dropped(), 1);
    }

    #[test]
    fn test_listener_drops_when_full() {
        let queue: EventQueue<OcclusionEvent, 1> = EventQueue::new();
        let producer = queue.producer();
        producer.on_event(event(10, 0));
        producer.on_event(event(11, 100));
        assert_eq!(queue.dropped(), 1);
        assert_eq!(queue.consumer().unwrap().try_receive(), Some(event(10, 0)));
    }

    #[test]
    fn test_drain_takes_only_queued_prefix() {
        let queue: EventQueue<OcclusionEvent, 8> = EventQueue::new();
        let producer = queue.producer();
        let consumer = queue.consumer().unwrap();
        for start in [0, 1_000, 2_000] {
            producer.on_event(event(10, start));
        }

        let mut seen = Vec::new();
        let handled = consumer.drain(|ev| {
            // An interrupt firing mid-drain
            producer.on_event(event(12, ev.start + 100_000));
            seen.push(ev.start);
        });

        assert_eq!(handled, 3);
        assert_eq!(seen, [0, 1_000, 2_000]);
        assert_eq!(queue.len(), 3);

        let mut next = Vec::new();
        consumer.drain(|ev| next.push(ev.sensor));
        assert_eq!(next, [12, 12, 12]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_empty_queue() {
        let queue: EventQueue<OcclusionEvent, 4> = EventQueue::new();
        assert_eq!(
            queue.consumer().unwrap().drain(|_| panic!("no events")),
            0
        );
    }

    #[test]
    fn test_consumer_is_handed_out_once() {
        let queue: EventQueue<u32, 4> = EventQueue::new();
        let consumer = queue.consumer().unwrap();
        assert!(queue.consumer().is_none());

        queue.try_send(7).unwrap();
        assert!(queue.consumer().is_none());
        assert_eq!(consumer.try_receive(), Some(7));
    }
}
