//! Tests for the deliveries binary.

#[cfg(test)]
mod args {
    use std::io::Write;
    use std::path::PathBuf;

    use chrono::NaiveDate;

    use dl_core::{GeneratorConfig, RouteMode, Verbosity};

    use crate::args::{command, NetworkSource, OutputFormat, Settings};
    use crate::network::DEFAULT_GRID_SIZE;

    fn settings(argv: &[&str]) -> anyhow::Result<Settings> {
        let matches = command().try_get_matches_from(std::iter::once("deliveries").chain(argv.iter().copied()))?;
        Settings::from_matches(&matches)
    }

    #[test]
    fn defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.config, GeneratorConfig::default());
        assert_eq!(s.network, NetworkSource::Grid(DEFAULT_GRID_SIZE));
        assert_eq!(s.out_dir, PathBuf::from("output"));
        assert_eq!(s.format, OutputFormat::Csv);
        assert!(s.restrict);
    }

    #[test]
    fn flags_override_defaults() {
        let s = settings(&[
            "--vehicles", "12",
            "--days", "3",
            "--start-day", "2021-03-01",
            "--route-mode", "shortest",
            "--disturb",
            "-v", "verbose",
            "--seed", "42",
            "--batch-size", "50",
            "-f", "parquet",
            "-o", "/tmp/run",
            "--no-restrict",
        ])
        .unwrap();
        assert_eq!(s.config.vehicles, Some(12));
        assert_eq!(s.config.days, Some(3));
        assert_eq!(s.config.start_day, NaiveDate::from_ymd_opt(2021, 3, 1).unwrap());
        assert_eq!(s.config.route_mode, RouteMode::Shortest);
        assert!(s.config.disturb);
        assert_eq!(s.config.verbosity, Verbosity::Verbose);
        assert_eq!(s.config.seed, 42);
        assert_eq!(s.config.batch_size, 50);
        assert_eq!(s.format, OutputFormat::Parquet);
        assert_eq!(s.out_dir, PathBuf::from("/tmp/run"));
        assert!(!s.restrict);
    }

    #[test]
    fn network_files_must_come_in_pairs() {
        assert!(settings(&["--nodes", "n.csv"]).is_err());
        let s = settings(&["--nodes", "n.csv", "--edges", "e.csv"]).unwrap();
        assert_eq!(
            s.network,
            NetworkSource::Files { nodes: "n.csv".into(), edges: "e.csv".into() }
        );
    }

    #[test]
    fn grid_conflicts_with_files() {
        assert!(settings(&["--grid", "5", "--nodes", "n.csv", "--edges", "e.csv"]).is_err());
        assert!(settings(&["--grid", "1"]).is_err(), "grid needs at least 2 nodes per side");
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(settings(&["--route-mode", "scenic"]).is_err());
        assert!(settings(&["--format", "xml"]).is_err());
        assert!(settings(&["--batch-size", "0"]).is_err(), "validated after overrides");
    }

    #[test]
    fn config_file_then_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, r#"{{ "seed": 99, "vehicles": 3, "start_day": "2020-06-08", "route_mode": "shortest" }}"#).unwrap();
        drop(f);

        let p = path.to_str().unwrap();
        let s = settings(&["-c", p]).unwrap();
        assert_eq!(s.config.seed, 99);
        assert_eq!(s.config.vehicles, Some(3));
        assert_eq!(s.config.start_day, NaiveDate::from_ymd_opt(2020, 6, 8).unwrap());
        assert_eq!(s.config.route_mode, RouteMode::Shortest);
        // Unset fields keep their defaults.
        assert_eq!(s.config.batch_size, GeneratorConfig::default().batch_size);

        let s = settings(&["-c", p, "--seed", "5"]).unwrap();
        assert_eq!(s.config.seed, 5);
        assert_eq!(s.config.vehicles, Some(3));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let err = settings(&["-c", "/nonexistent/config.json"]).unwrap_err();
        assert!(err.to_string().contains("cannot open config file"));
    }
}

#[cfg(test)]
mod network {
    use crate::network::synthetic_grid;

    #[test]
    fn grid_is_strongly_connected() {
        for size in [2, 3, 6] {
            let net = synthetic_grid(size);
            assert_eq!(net.node_count(), (size * size) as usize);
            let restricted = net.restrict_to_largest_scc();
            assert_eq!(restricted.node_count(), net.node_count(), "size {size}");
        }
    }

    #[test]
    fn grid_uses_one_based_external_ids() {
        let net = synthetic_grid(3);
        assert_eq!(net.node_ext_id[0], 1);
        assert_eq!(net.node_ext_id[8], 9);
        assert_eq!(net.edge_count(), 12);
    }
}

#[cfg(test)]
mod run {
    use dl_core::{GeneratorConfig, Verbosity};
    use dl_generator::GeneratorBuilder;

    use crate::args::OutputFormat;
    use crate::network::synthetic_grid;
    use crate::{log_directive, run};

    #[test]
    fn verbosity_maps_to_filter() {
        assert_eq!(log_directive(Verbosity::None), "off");
        assert_eq!(log_directive(Verbosity::Minimal), "info");
        assert_eq!(log_directive(Verbosity::Medium), "debug");
        assert_eq!(log_directive(Verbosity::Verbose), "trace");
    }

    #[test]
    fn csv_run_writes_all_files() {
        let config = GeneratorConfig {
            warehouses: Some(1),
            vehicles: Some(2),
            days: Some(7),
            ..GeneratorConfig::default()
        };
        let generator = GeneratorBuilder::new(config, synthetic_grid(5)).build().unwrap();
        let dir = tempfile::tempdir().unwrap();

        let summary = run(&generator, OutputFormat::Csv, dir.path()).unwrap();
        // 2020-06-01 is a Monday: six working days per vehicle.
        assert_eq!(summary.planned_routes, 12);
        assert_eq!(summary.non_working_slots, 2);
        assert_eq!(summary.deliveries + summary.dropped(), 12);

        let mut rdr = csv::Reader::from_path(dir.path().join("deliveries.csv")).unwrap();
        assert_eq!(rdr.records().count(), summary.deliveries);
    }

    #[cfg(not(feature = "sqlite"))]
    #[test]
    fn backend_not_compiled_in() {
        let generator = GeneratorBuilder::new(GeneratorConfig::default(), synthetic_grid(3))
            .build()
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let err = run(&generator, OutputFormat::Sqlite, dir.path()).unwrap_err();
        assert!(err.to_string().contains("not compiled in"));
    }
}
