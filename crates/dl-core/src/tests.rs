//! Unit tests for dl-core primitives.

#[cfg(test)]
mod ids {
    use crate::{DeliveryId, EdgeId, NodeId, VehicleId};

    #[test]
    fn index_roundtrip() {
        let id = NodeId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(NodeId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(VehicleId(0) < VehicleId(1));
        assert!(NodeId(100) > NodeId(99));
    }

    #[test]
    fn invalid_sentinels_are_max() {
        assert_eq!(NodeId::INVALID.0, u32::MAX);
        assert_eq!(EdgeId::INVALID.0, u32::MAX);
        assert_eq!(DeliveryId::default(), DeliveryId::INVALID);
        assert!(!NodeId::default().is_valid());
        assert!(NodeId(0).is_valid());
    }

    #[test]
    fn display() {
        assert_eq!(VehicleId(7).to_string(), "vehicle 7");
        assert_eq!(DeliveryId(12).to_string(), "delivery 12");
    }
}

#[cfg(test)]
mod geo {
    use crate::{LineString, Point};

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
    }

    #[test]
    fn lerp_midpoint() {
        let m = Point::new(0.0, 0.0).lerp(Point::new(10.0, -4.0), 0.5);
        assert_eq!(m, Point::new(5.0, -2.0));
    }

    #[test]
    fn linestring_length_and_reverse() {
        let l = LineString::new(vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 4.0),
            Point::new(3.0, 10.0),
        ]);
        assert_eq!(l.length(), 11.0);
        let r = l.reversed();
        assert_eq!(r.first(), Some(Point::new(3.0, 10.0)));
        assert_eq!(r.last(), Some(Point::new(0.0, 0.0)));
        assert_eq!(r.length(), l.length());
    }

    #[test]
    fn wkt_display() {
        let l = LineString::new(vec![Point::new(0.0, 0.0), Point::new(1.5, 2.0)]);
        assert_eq!(l.to_string(), "LINESTRING(0 0,1.5 2)");
        assert_eq!(Point::new(1.0, 2.5).to_string(), "POINT(1 2.5)");
        assert_eq!(LineString::default().to_string(), "LINESTRING EMPTY");
    }

    #[test]
    fn wkt_parse() {
        let l = LineString::parse_wkt("LINESTRING(0 0, 10.5 -3)").unwrap();
        assert_eq!(l.points(), &[Point::new(0.0, 0.0), Point::new(10.5, -3.0)]);
        assert!(LineString::parse_wkt("linestring (1 2,3 4)").is_some());
    }

    #[test]
    fn wkt_parse_rejects_garbage() {
        assert!(LineString::parse_wkt("POINT(1 2)").is_none());
        assert!(LineString::parse_wkt("LINESTRING(1 2)").is_none()); // one vertex
        assert!(LineString::parse_wkt("LINESTRING(1 x, 2 3)").is_none());
        assert!(LineString::parse_wkt("").is_none());
    }
}

#[cfg(test)]
mod time {
    use chrono::{NaiveDate, Timelike, Weekday, Datelike};

    use crate::time::{format_timestamp, is_working_day, minutes_f64, Calendar};

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()
    }

    #[test]
    fn start_day_is_monday() {
        assert_eq!(monday().weekday(), Weekday::Mon);
    }

    #[test]
    fn sunday_is_not_working() {
        let sunday = NaiveDate::from_ymd_opt(2020, 6, 7).unwrap();
        assert!(!is_working_day(sunday));
        assert!(is_working_day(monday()));
    }

    #[test]
    fn calendar_days() {
        let cal = Calendar::new(monday(), 8);
        let days: Vec<_> = cal.iter().collect();
        assert_eq!(days.len(), 8);
        assert_eq!(days[6].1.weekday(), Weekday::Sun);
        assert_eq!(cal.working_days(), 7);
        assert!(cal.date(8).is_none());
    }

    #[test]
    fn at_hour_and_format() {
        let t = Calendar::at_hour(monday(), 7).unwrap() + minutes_f64(1.5);
        assert_eq!(t.hour(), 7);
        assert_eq!(format_timestamp(t), "2020-06-01 07:01:30.000");
    }
}

#[cfg(test)]
mod rng {
    use crate::{Stream, StreamRng, VehicleId};

    #[test]
    fn deterministic_same_seed() {
        let stream = Stream::Planning { vehicle: VehicleId(3), day: 1 };
        let mut r1 = StreamRng::new(12345, stream);
        let mut r2 = StreamRng::new(12345, stream);
        for _ in 0..100 {
            let a: u64 = r1.random();
            let b: u64 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_streams_differ() {
        let mut plan = StreamRng::new(1, Stream::Planning { vehicle: VehicleId(0), day: 0 });
        let mut synth = StreamRng::new(1, Stream::Synthesis { vehicle: VehicleId(0), day: 0 });
        let mut next_day = StreamRng::new(1, Stream::Planning { vehicle: VehicleId(0), day: 1 });
        let a: u64 = plan.random();
        let b: u64 = synth.random();
        let c: u64 = next_day.random();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn uniform_int_inclusive() {
        let mut rng = StreamRng::from_seed(0);
        let mut seen = [false; 5];
        for _ in 0..1000 {
            let v = rng.uniform_int(3, 7);
            assert!((3..=7).contains(&v));
            seen[(v - 3) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s), "every value in [3,7] should appear");
        assert_eq!(rng.uniform_int(4, 4), 4);
    }

    #[test]
    fn bounded_gauss_in_bounds() {
        let mut rng = StreamRng::from_seed(7);
        let mut sum = 0.0;
        for _ in 0..2000 {
            let v = rng.bounded_gauss(10.0, 60.0);
            assert!((10.0..=60.0).contains(&v), "got {v}");
            sum += v;
        }
        let mean = sum / 2000.0;
        assert!((mean - 35.0).abs() < 2.0, "mean {mean} should be near 35");
    }

    #[test]
    fn gauss_degenerate_sd() {
        let mut rng = StreamRng::from_seed(0);
        assert_eq!(rng.gauss(5.0, 0.0), 5.0);
        assert_eq!(rng.gauss(5.0, -1.0), 5.0);
        assert_eq!(rng.gauss(5.0, f64::NAN), 5.0);
        assert_eq!(rng.gauss(5.0, f64::INFINITY), 5.0);
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = StreamRng::from_seed(0);
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
    }
}

#[cfg(test)]
mod config {
    use crate::{GeneratorConfig, RouteMode, Verbosity};

    #[test]
    fn default_scale_factor_counts() {
        let cfg = GeneratorConfig::default();
        assert_eq!(cfg.warehouse_count(), 7);
        assert_eq!(cfg.vehicle_count(), 71);
        assert_eq!(cfg.day_count(), 4);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn explicit_counts_override() {
        let cfg = GeneratorConfig {
            warehouses: Some(2),
            vehicles:   Some(5),
            days:       Some(9),
            ..GeneratorConfig::default()
        };
        assert_eq!(cfg.warehouse_count(), 2);
        assert_eq!(cfg.vehicle_count(), 5);
        assert_eq!(cfg.day_count(), 9);
        assert_eq!(cfg.calendar().days, 9);
    }

    #[test]
    fn tiny_scale_keeps_one_of_each() {
        let cfg = GeneratorConfig { scale_factor: 1e-9, ..GeneratorConfig::default() };
        assert_eq!(cfg.warehouse_count(), 1);
        assert_eq!(cfg.vehicle_count(), 1);
        assert_eq!(cfg.day_count(), 2);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let zero_batch = GeneratorConfig { batch_size: 0, ..GeneratorConfig::default() };
        assert!(zero_batch.validate().is_err());

        let zero_vehicles = GeneratorConfig { vehicles: Some(0), ..GeneratorConfig::default() };
        assert!(zero_vehicles.validate().is_err());

        let bad_velocity = GeneratorConfig { min_velocity_kmh: 0.0, ..GeneratorConfig::default() };
        assert!(bad_velocity.validate().is_err());

        let bad_scale = GeneratorConfig { scale_factor: -1.0, ..GeneratorConfig::default() };
        assert!(bad_scale.validate().is_err());
    }

    #[test]
    fn parse_enums() {
        assert_eq!("Shortest".parse::<RouteMode>().unwrap(), RouteMode::Shortest);
        assert_eq!("fastest".parse::<RouteMode>().unwrap(), RouteMode::Fastest);
        assert!("quickest".parse::<RouteMode>().is_err());
        assert_eq!("verbose".parse::<Verbosity>().unwrap(), Verbosity::Verbose);
        assert!(Verbosity::None < Verbosity::Minimal);
        assert!("loud".parse::<Verbosity>().is_err());
    }
}
