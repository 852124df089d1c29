//! Unit tests for agv-core primitives.

#[cfg(test)]
mod ids {
    use crate::{CellId, IntersectionId, RobotId};

    #[test]
    fn index_roundtrip() {
        let id = RobotId(3);
        assert_eq!(id.index(), 3);
        assert_eq!(RobotId::try_from(3usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(CellId::INVALID.0, u32::MAX);
        assert_eq!(IntersectionId::INVALID.0, u16::MAX);
        assert!(!CellId::INVALID.is_valid());
        assert!(CellId(18).is_valid());
    }

    #[test]
    fn default_is_invalid() {
        assert_eq!(CellId::default(), CellId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(RobotId(2).to_string(), "RobotId(2)");
    }
}

#[cfg(test)]
mod time {
    use crate::{SimClock, SimConfig, Tick};

    #[test]
    fn tick_arithmetic() {
        let t = Tick(10);
        assert_eq!(t + 5, Tick(15));
        assert_eq!(t.offset(3), Tick(13));
        assert_eq!(Tick(15) - Tick(10), 5u64);
        assert_eq!(Tick(3).since(Tick(7)), 0);
    }

    #[test]
    fn clock_elapsed() {
        let mut clock = SimClock::new(10);
        assert_eq!(clock.elapsed_ms(), 0);
        clock.advance();
        clock.advance();
        assert_eq!(clock.elapsed_ms(), 20);
        assert_eq!(clock.to_string(), "T2 (0.020 s)");
    }

    #[test]
    fn ticks_for_ms_rounds_up() {
        let clock = SimClock::new(10);
        assert_eq!(clock.ticks_for_ms(100), 10);
        assert_eq!(clock.ticks_for_ms(105), 11);
        assert_eq!(clock.ticks_for_ms(0), 1);
    }

    #[test]
    fn reference_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.tick_duration_ms, 10);
        assert_eq!(config.end_tick(), Tick(5_400));
        assert_eq!(config.bulk_capacity, 80);
    }
}

#[cfg(test)]
mod codes {
    use crate::{AgvError, ControlCommand, Decoded, MovementStatus, NavCode};

    #[test]
    fn ranges_are_disjoint() {
        for raw in 0..=4u16 {
            assert!(matches!(NavCode(raw).decode(), Some(Decoded::Movement(_))));
        }
        for raw in 5..=11u16 {
            assert!(matches!(NavCode(raw).decode(), Some(Decoded::Control(_))));
        }
        assert_eq!(NavCode(12).decode(), None);
    }

    #[test]
    fn typed_codes_convert() {
        assert_eq!(NavCode::from(MovementStatus::RelayStopped), NavCode(3));
        assert_eq!(NavCode::from(ControlCommand::Halt), NavCode(7));
        assert_eq!(
            NavCode(10).decode(),
            Some(Decoded::Control(ControlCommand::SpeedProfile)),
        );
    }

    #[test]
    fn try_from_checks_the_range() {
        assert_eq!(MovementStatus::try_from(NavCode(2)), Ok(MovementStatus::CrossingBegin));
        assert_eq!(ControlCommand::try_from(NavCode(8)), Ok(ControlCommand::Hold));
        assert_eq!(
            ControlCommand::try_from(NavCode(4)),
            Err(AgvError::WrongRange { code: NavCode(4), expected: "control command" }),
        );
        let err = MovementStatus::try_from(NavCode(40)).unwrap_err();
        assert_eq!(err.to_string(), "unknown navigation code UNKNOWN(40)");
    }

    #[test]
    fn names() {
        assert_eq!(NavCode(7).name(), "STOP1");
        assert_eq!(NavCode(3).name(), "STOPPED2");
        assert_eq!(NavCode(99).name(), "UNKNOWN");
        assert_eq!(NavCode(11).to_string(), "PATH(11)");
    }
}

#[cfg(test)]
mod tokens {
    use crate::{Kinematics, SpeedStep, TokenStream};

    #[test]
    fn accelerate_by_whole_steps() {
        let k = Kinematics::default();
        let s = TokenStream::between(0, 2_000, &k);
        assert_eq!(s.len(), 20);
        assert!(s.iter().all(|t| t == SpeedStep::Accelerate));
        assert_eq!(s.signed_total(&k), 2_000);
    }

    #[test]
    fn accelerate_trims_overshoot() {
        let k = Kinematics::default();
        let s = TokenStream::between(0, 2_650, &k);
        // 27 × +100 = 2700, then one −50.
        assert_eq!(s.iter().filter(|&t| t == SpeedStep::Accelerate).count(), 27);
        assert_eq!(s.iter().filter(|&t| t == SpeedStep::Decelerate).count(), 1);
        assert_eq!(s.signed_total(&k), 2_650);
    }

    #[test]
    fn decelerate_uses_small_steps() {
        let k = Kinematics::default();
        let s = TokenStream::between(2_000, 1_350, &k);
        assert_eq!(s.len(), 13);
        assert_eq!(s.signed_total(&k), -650);
    }

    #[test]
    fn no_change_is_empty() {
        let k = Kinematics::default();
        assert!(TokenStream::between(500, 500, &k).is_empty());
    }

    #[test]
    fn pop_consumes_front() {
        let mut s: TokenStream = [SpeedStep::Decelerate, SpeedStep::Accelerate]
            .into_iter()
            .collect();
        assert_eq!(s.pop(), Some(SpeedStep::Decelerate));
        s.extend([SpeedStep::Decelerate]);
        assert_eq!(s.pop(), Some(SpeedStep::Accelerate));
        assert_eq!(s.pop(), Some(SpeedStep::Decelerate));
        assert_eq!(s.pop(), None);
    }
}

#[cfg(test)]
mod kinematics {
    use crate::Kinematics;

    #[test]
    fn edge_and_center_windows() {
        let k = Kinematics::default();
        assert!(k.near_edge(0));
        assert!(k.near_edge(20_000));
        assert!(!k.near_edge(20_001));
        assert!(k.near_edge(180_000));
        assert!(k.near_center(100_000, 98_000));
        assert!(!k.near_center(100_000, 97_999));
    }
}
