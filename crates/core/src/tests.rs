#[cfg(test)]
mod tests {
    use crate::bits::{swap_optional, WORD_BITS};
    use crate::controller::{DEFAULT_IDLE_MS, ORGANIZATION_NAME, OPERATOR_NAME};
    use crate::selftest::{self, SAMPLES_PER_RUN};
    use crate::{
        count_set_bits, is_bit_set, swap, xor_swap, AppState, BitIndexError, Board, Debouncer,
        DemoController, SwitchFlag,
    };
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::fmt;

    fn leak_flag() -> &'static SwitchFlag {
        Box::leak(Box::new(SwitchFlag::new(false)))
    }

    /// Board double that records everything the controller does.
    #[derive(Default)]
    struct RecordingBoard {
        inits: usize,
        clears: usize,
        rows: Vec<(u8, String)>,
        console: Vec<String>,
        sleeps: Vec<u32>,
        button: Option<&'static SwitchFlag>,
        // Simulates a press landing while a routine is printing.
        press_while_printing: bool,
    }

    impl Board for RecordingBoard {
        fn init(&mut self) {
            self.inits += 1;
        }

        fn clear_display(&mut self) {
            self.clears += 1;
        }

        fn write_line(&mut self, row: u8, text: &str) {
            self.rows.push((row, text.to_string()));
        }

        fn print(&mut self, line: fmt::Arguments<'_>) {
            self.console.push(line.to_string());
            if self.press_while_printing {
                if let Some(flag) = self.button {
                    flag.raise();
                }
            }
        }

        fn register_button(&mut self, switch: &'static SwitchFlag) {
            self.button = Some(switch);
        }

        fn sleep_ms(&mut self, ms: u32) {
            self.sleeps.push(ms);
        }
    }

    #[test]
    fn test_swap_examples() {
        assert_eq!(swap(10, 20), (20, 10));
        assert_eq!(swap(10, 10), (10, 10));
        assert_eq!(swap(0, 20), (20, 0));
        assert_eq!(swap(10, 0), (0, 10));
        assert_eq!(swap(i32::MIN, i32::MAX), (i32::MAX, i32::MIN));
        assert_eq!(swap(-1i32, 7), (7, -1));
    }

    #[test]
    fn test_swap_property() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..1000 {
            let x: i32 = rng.gen();
            let y: i32 = rng.gen();
            assert_eq!(swap(x, y), (y, x));
            assert_eq!(swap(x, x), (x, x));

            let (a, b) = swap(x, y);
            assert_eq!(swap(a, b), (x, y));
        }
    }

    #[test]
    fn test_xor_swap_in_place() {
        let mut a: u8 = 0xA5;
        let mut b: u8 = 0x0F;
        xor_swap(&mut a, &mut b);
        assert_eq!((a, b), (0x0F, 0xA5));

        let mut c: u64 = 42;
        let mut d: u64 = 42;
        xor_swap(&mut c, &mut d);
        assert_eq!((c, d), (42, 42));
    }

    #[test]
    fn test_swap_optional_requires_both_sides() {
        let mut a = 10;
        let mut b = 20;
        swap_optional(Some(&mut a), None);
        assert_eq!((a, b), (10, 20));
        swap_optional(None, Some(&mut b));
        assert_eq!((a, b), (10, 20));
        swap_optional::<i32>(None, None);

        swap_optional(Some(&mut a), Some(&mut b));
        assert_eq!((a, b), (20, 10));
    }

    #[test]
    fn test_count_set_bits_matches_naive_count() {
        for v in 0..=u8::MAX {
            let naive = (0..8).filter(|bit| (v >> bit) & 1 == 1).count() as u8;
            let count = count_set_bits(v);
            assert_eq!(count, naive, "value {:#04x}", v);
            assert!(count <= 8);
        }
    }

    #[test]
    fn test_count_set_bits_examples() {
        assert_eq!(count_set_bits(0), 0);
        assert_eq!(count_set_bits(0xFF), 8);
        assert_eq!(count_set_bits(0xAA), 4);
        assert_eq!(count_set_bits(0x80), 1);
        assert_eq!(count_set_bits(0x7E), 6);
    }

    #[test]
    fn test_is_bit_set_examples() {
        assert_eq!(is_bit_set(0x1, 0), Ok(true));
        assert_eq!(is_bit_set(0x2, 0), Ok(false));
        assert_eq!(is_bit_set(0x2, 1), Ok(true));
        assert_eq!(is_bit_set(0x8000_0000, 31), Ok(true));
        assert_eq!(is_bit_set(0x7FFF_FFFF, 31), Ok(false));
    }

    #[test]
    fn test_is_bit_set_matches_shift() {
        let mut rng = StdRng::seed_from_u64(31);
        for _ in 0..200 {
            let v: u32 = rng.gen();
            for i in 0..WORD_BITS {
                assert_eq!(is_bit_set(v, i), Ok((v >> i) & 1 == 1));
            }
        }
    }

    #[test]
    fn test_is_bit_set_rejects_out_of_range_index() {
        assert_eq!(
            is_bit_set(u32::MAX, 32),
            Err(BitIndexError::OutOfRange { index: 32 })
        );
        let err = is_bit_set(0, u32::MAX).unwrap_err();
        assert!(err.to_string().contains("outside 0..=31"));
    }

    #[test]
    fn test_app_state_round_robin() {
        assert_eq!(AppState::Init.next(), AppState::SwapTest);
        assert_eq!(AppState::SwapTest.next(), AppState::CountBitsTest);
        assert_eq!(AppState::CountBitsTest.next(), AppState::CheckBitTest);
        assert_eq!(AppState::CheckBitTest.next(), AppState::Init);
        assert_eq!(AppState::from_index(6), AppState::CountBitsTest);
        assert_eq!(AppState::CheckBitTest.to_string(), "check_bit_test");
    }

    #[test]
    fn test_swap_selftest_output() {
        let mut board = RecordingBoard::default();
        selftest::swap_test(&mut board);
        assert_eq!(
            board.console,
            vec![
                "--Swap Data Test--",
                "Input(D1=10, D2=20) --> Output(D1=20, D2=10)",
                "Input(D1=10, D2=10) --> Output(D1=10, D2=10)",
                "Input(D1=0, D2=20) --> Output(D1=20, D2=0)",
                "Input(D1=10, D2=0) --> Output(D1=0, D2=10)",
            ]
        );
    }

    #[test]
    fn test_count_bits_selftest_output() {
        let mut board = RecordingBoard::default();
        // 0xFE, 0xFF, 0x100, ... reduced modulo 0xFF.
        let mut rng = StepRng::new(0xFE, 1);
        selftest::count_bits_test(&mut board, &mut rng);
        assert_eq!(
            board.console,
            vec![
                "--Number of Set Bits in a Byte Test--",
                "Number of Set Bits in: 0xFE = 7",
                "Number of Set Bits in: 0x0 = 0",
                "Number of Set Bits in: 0x1 = 1",
                "Number of Set Bits in: 0x2 = 1",
                "Number of Set Bits in: 0x3 = 2",
            ]
        );
    }

    #[test]
    fn test_check_bit_selftest_output() {
        let mut board = RecordingBoard::default();
        let mut rng = StepRng::new(0x25, 0);
        selftest::check_bit_test(&mut board, &mut rng);
        assert_eq!(board.console.len(), SAMPLES_PER_RUN + 1);
        assert_eq!(board.console[0], "--Nth Bit Set Test--");
        assert!(board.console[1..]
            .iter()
            .all(|line| line == "Is Bit 5 set in 0x25? = TRUE(1)"));

        let mut board = RecordingBoard::default();
        let mut rng = StepRng::new(1, 0);
        selftest::check_bit_test(&mut board, &mut rng);
        assert_eq!(board.console[1], "Is Bit 1 set in 0x1? = FALSE(0)");
    }

    #[test]
    fn test_selftests_are_reproducible_with_seeded_rng() {
        let mut first = RecordingBoard::default();
        let mut second = RecordingBoard::default();
        selftest::check_bit_test(&mut first, &mut StdRng::seed_from_u64(7));
        selftest::check_bit_test(&mut second, &mut StdRng::seed_from_u64(7));
        assert_eq!(first.console, second.console);
    }

    #[test]
    fn test_controller_starts_with_pending_init() {
        let flag = leak_flag();
        let controller = DemoController::new(flag, StepRng::new(0, 1));
        assert!(flag.is_raised());
        assert_eq!(controller.state(), AppState::CheckBitTest);
        assert!(!controller.init_done());

        let mut board = RecordingBoard::default();
        controller.start(&mut board);
        assert_eq!(board.inits, 1);
        assert!(std::ptr::eq(board.button.unwrap(), flag));
    }

    #[test]
    fn test_first_transition_renders_identity() {
        let flag = leak_flag();
        let mut controller = DemoController::new(flag, StepRng::new(0, 1));
        let mut board = RecordingBoard::default();

        let t = controller.poll(&mut board).unwrap();
        assert_eq!(t.from, AppState::CheckBitTest);
        assert_eq!(t.to, AppState::Init);
        assert!(!t.skipped_init);
        assert!(controller.init_done());
        assert!(!flag.is_raised());

        assert_eq!(board.clears, 1);
        assert_eq!(
            board.rows,
            vec![
                (0, OPERATOR_NAME.to_string()),
                (1, ORGANIZATION_NAME.to_string())
            ]
        );
        assert_eq!(board.console, vec![OPERATOR_NAME, ORGANIZATION_NAME]);
    }

    #[test]
    fn test_idle_poll_sleeps() {
        let flag = leak_flag();
        let mut controller = DemoController::new(flag, StepRng::new(0, 1)).with_idle_ms(25);
        let mut board = RecordingBoard::default();
        controller.poll(&mut board);

        assert!(controller.poll(&mut board).is_none());
        assert!(controller.poll(&mut board).is_none());
        assert_eq!(board.sleeps, vec![25, 25]);
        assert_eq!(controller.state(), AppState::Init);
    }

    #[test]
    fn test_default_idle_interval() {
        let flag = leak_flag();
        let mut controller = DemoController::new(flag, StepRng::new(0, 1));
        flag.clear();
        let mut board = RecordingBoard::default();
        assert!(controller.poll(&mut board).is_none());
        assert_eq!(board.sleeps, vec![DEFAULT_IDLE_MS]);
    }

    #[test]
    fn test_state_sequence_skips_init_after_first_pass() {
        let flag = leak_flag();
        let mut controller = DemoController::new(flag, StepRng::new(0, 1));
        let mut board = RecordingBoard::default();

        let mut visited = Vec::new();
        for _ in 0..8 {
            flag.raise();
            let t = controller.poll(&mut board).unwrap();
            visited.push(t.to);
        }

        assert_eq!(
            visited,
            vec![
                AppState::Init,
                AppState::SwapTest,
                AppState::CountBitsTest,
                AppState::CheckBitTest,
                AppState::SwapTest,
                AppState::CountBitsTest,
                AppState::CheckBitTest,
                AppState::SwapTest,
            ]
        );
        // Banner is rendered exactly once.
        assert_eq!(board.rows.len(), 2);
        assert_eq!(board.clears, 1);
    }

    #[test]
    fn test_wrap_reports_skipped_init() {
        let flag = leak_flag();
        let mut controller = DemoController::new(flag, StepRng::new(0, 1));
        let mut board = RecordingBoard::default();
        for _ in 0..4 {
            flag.raise();
            controller.poll(&mut board);
        }
        assert_eq!(controller.state(), AppState::CheckBitTest);

        flag.raise();
        let t = controller.poll(&mut board).unwrap();
        assert_eq!(t.from, AppState::CheckBitTest);
        assert_eq!(t.to, AppState::SwapTest);
        assert!(t.skipped_init);
    }

    #[test]
    fn test_dispatch_runs_matching_selftest() {
        let flag = leak_flag();
        let mut controller = DemoController::new(flag, StepRng::new(0, 1));
        let mut board = RecordingBoard::default();
        controller.poll(&mut board);

        flag.raise();
        controller.poll(&mut board);
        assert!(board.console.contains(&"--Swap Data Test--".to_string()));

        flag.raise();
        controller.poll(&mut board);
        assert!(board
            .console
            .contains(&"--Number of Set Bits in a Byte Test--".to_string()));

        flag.raise();
        controller.poll(&mut board);
        assert_eq!(
            board.console.last().map(String::as_str),
            Some("Is Bit 14 set in 0xD? = FALSE(0)")
        );
    }

    #[test]
    fn test_press_during_routine_is_absorbed() {
        let flag = leak_flag();
        let mut controller = DemoController::new(flag, StepRng::new(0, 1));
        let mut board = RecordingBoard::default();
        controller.start(&mut board);
        board.press_while_printing = true;

        controller.poll(&mut board).unwrap();
        assert!(!flag.is_raised());
        assert!(controller.poll(&mut board).is_none());
    }

    #[test]
    fn test_switch_flag() {
        let flag = SwitchFlag::default();
        assert!(!flag.is_raised());
        flag.raise();
        flag.raise();
        assert!(flag.is_raised());
        flag.clear();
        assert!(!flag.is_raised());
    }

    #[test]
    fn test_debouncer_filters_bounce() {
        let mut button = Debouncer::new(3);

        // Contact bounce shorter than the threshold is ignored.
        let bounce = [true, false, true, true, false];
        assert!(bounce.iter().all(|&level| !button.sample(level)));
        assert!(!button.is_pressed());

        assert!(!button.sample(true));
        assert!(!button.sample(true));
        assert!(button.sample(true));
        assert!(button.is_pressed());

        // Holding the button does not repeat the edge.
        assert!((0..10).all(|_| !button.sample(true)));

        // Release is accepted but not reported.
        assert!((0..3).all(|_| !button.sample(false)));
        assert!(!button.is_pressed());

        assert!(!button.sample(true));
        assert!(!button.sample(true));
        assert!(button.sample(true));
    }

    #[test]
    fn test_debouncer_zero_threshold_acts_immediately() {
        let mut button = Debouncer::new(0);
        assert!(button.sample(true));
        assert!(!button.sample(true));
        assert!(!button.sample(false));
        assert!(button.sample(true));
    }
}
