mod tests {
    use smart_leds::{RGB8, SmartLedsWrite};
    use track_light_composer::{Grid, OutputDriver, Pixel, SmartLedsOutput};

    #[derive(Default)]
    struct Strip {
        leds: Vec<RGB8>,
        fail: bool,
    }

    impl SmartLedsWrite for Strip {
        type Error = ();
        type Color = RGB8;

        fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
        where
            T: IntoIterator<Item = I>,
            I: Into<Self::Color>,
        {
            if self.fail {
                return Err(());
            }
            self.leds = iterator.into_iter().map(Into::into).collect();
            Ok(())
        }
    }

    #[test]
    fn test_frame_is_converted_in_strip_order() {
        let mut grid = Grid::<2, 6>::new(&[3, 3]).unwrap();
        let color = Pixel::new(0.6, 1.0, 1.0);
        grid.set(1, 0, color);

        let mut output = SmartLedsOutput::new(Strip::default());
        grid.show(&mut output);

        let strip = output.into_inner();
        assert_eq!(strip.leds.len(), 6);
        assert_eq!(strip.leds[5], color.to_rgb());
        assert_ne!(strip.leds[5], RGB8::default());
        for (index, led) in strip.leds.iter().enumerate() {
            if index != 5 {
                assert_eq!(*led, RGB8::default());
            }
        }
    }

    #[test]
    fn test_failed_writes_are_counted() {
        let mut output = SmartLedsOutput::new(Strip {
            leds: Vec::new(),
            fail: true,
        });
        output.write(&[Pixel::OFF; 4]);
        output.write(&[Pixel::OFF; 4]);
        assert_eq!(output.failed_writes(), 2);
    }

    #[test]
    fn test_pixel_conversion() {
        let hsv = Pixel::new(0.0, 1.0, 1.0).to_hsv8();
        assert_eq!((hsv.hue, hsv.sat, hsv.val), (0, 255, 255));
        assert_eq!(Pixel::OFF.to_rgb(), RGB8::default());
        assert_eq!(Pixel::new(0.5, 0.0, 0.0).to_rgb(), RGB8::default());
    }
}
