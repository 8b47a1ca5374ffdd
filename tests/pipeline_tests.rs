use std::path::{Path, PathBuf};

use logger_report::config::ReportConfig;
use logger_report::data::loader::load_file;
use logger_report::data::sanitize::LineSanitizer;
use logger_report::error::{LoadError, ReportError};
use logger_report::pipeline;
use tempfile::TempDir;

const LOG: &str = "Logger-id\tDate_time\tTMP1\tTMP2\tVbatt
Logger-id\tDate_time\tTMP1\tTMP2\tVbatt
L1\t2023-01-01T00:00:00\t20.0\t18.5\t4100
# power dip
L1\t2023-01-01T00:01:00\t21.0\t18.75\t4095
L1\t2023-01-01T00:0
Logger-id\tDate_time\tTMP1\tTMP2\tVbatt
L1\t2023-01-01T00:02:00\t22.0\t19.0\t4090
";

fn write_input(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path
}

fn config_into(out: &Path) -> ReportConfig {
    ReportConfig {
        output_dir: Some(out.to_path_buf()),
        ..ReportConfig::headless()
    }
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

#[test]
fn full_run_repairs_the_log_and_writes_every_output() {
    let tmp = TempDir::new().unwrap();
    let input = write_input(tmp.path(), "log.tsv", LOG);
    let out = tmp.path().join("reports");

    let config = ReportConfig {
        save_statistics_json: true,
        export_spreadsheets: true,
        ..config_into(&out)
    };
    let report = pipeline::run(&input, &config).unwrap();

    assert_eq!(report.table.len(), 3);
    assert_eq!(report.title, "L1");
    assert_eq!(report.sensors, vec!["TMP1".to_string(), "TMP2".to_string()]);
    assert!(report.stats_failures.is_empty());
    assert!(report.distribution_error().is_none());
    assert_eq!(report.summary.duration, "0:02:00");

    let tmp1 = &report.summary.sensors[0];
    assert_eq!((tmp1.mean, tmp1.min, tmp1.max), (21.0, 20.0, 22.0));

    assert_eq!(
        files_in(&out),
        vec![
            "2023-01-01T00_02_00_interactive_plot_log.html",
            "2023-01-01T00_02_00_statistics_log.json",
            "2023-01-01T00_02_00_statistics_log.tsv",
            "2023-01-01T00_02_00_table_log.csv",
            "2023-01-01T00_02_00_table_log.parquet",
            "2023-01-01T00_02_00_table_log.xlsx",
        ]
    );
    assert_eq!(report.written.len(), 6);
    let workbook = std::fs::read(out.join("2023-01-01T00_02_00_table_log.xlsx")).unwrap();
    assert!(workbook.starts_with(b"PK"));

    let stats = std::fs::read_to_string(out.join("2023-01-01T00_02_00_statistics_log.tsv")).unwrap();
    let mut lines = stats.lines();
    assert!(lines.next().unwrap().starts_with("Sensor\tMean"));
    assert_eq!(lines.next().unwrap(), "TMP1\t21.00\t20.00\t22.00\t1.00\t0:02:00");

    let battery = report.figures.as_ref().unwrap().battery.as_ref().unwrap();
    assert_eq!(battery.series[0].points.len(), 3);
}

#[test]
fn missing_timestamp_column_is_fatal_and_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let input = write_input(tmp.path(), "bad.tsv", "Logger-id\tTime\tTMP1\nL1\t00:00\t20.0\n");
    let out = tmp.path().join("reports");

    let err = pipeline::run(&input, &config_into(&out)).unwrap_err();
    match &err {
        ReportError::Load(LoadError::MissingTimestampColumn { column, preview }) => {
            assert_eq!(column, "Date_time");
            assert!(preview.contains("TMP1"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().starts_with("Datum stamp \"Date_time\" is missing"));
    assert!(!out.exists());
}

#[test]
fn exported_tables_reload_with_the_same_values() {
    let tmp = TempDir::new().unwrap();
    let input = write_input(tmp.path(), "log.tsv", LOG);
    let out = tmp.path().join("reports");

    let config = ReportConfig {
        export_spreadsheets: true,
        save_html: false,
        ..config_into(&out)
    };
    let report = pipeline::run(&input, &config).unwrap();
    let original = &report.table;

    let sanitizer = LineSanitizer::new(config.sanitizer_config());
    for name in [
        "2023-01-01T00_02_00_table_log.csv",
        "2023-01-01T00_02_00_table_log.parquet",
    ] {
        let reloaded = load_file(&out.join(name), &sanitizer).unwrap();
        assert_eq!(reloaded.len(), original.len(), "{name}");
        for sensor in ["TMP1", "TMP2", "Vbatt"] {
            let values = |t: &logger_report::data::model::LoggerTable| -> Vec<Option<f64>> {
                t.column(sensor)
                    .unwrap()
                    .cells
                    .iter()
                    .map(|c| c.as_f64())
                    .collect()
            };
            assert_eq!(values(&reloaded), values(original), "{name} {sensor}");
        }
    }
}

#[test]
fn broken_sensor_is_left_out_of_the_summary() {
    let tmp = TempDir::new().unwrap();
    let input = write_input(
        tmp.path(),
        "mixed.tsv",
        "Date_time\tTMP1\tTMP2\n2023-01-01T00:00:00\t20.0\toff\n2023-01-01T00:10:00\t22.0\t19.0\n",
    );
    let out = tmp.path().join("reports");

    let config = ReportConfig {
        save_html: false,
        ..config_into(&out)
    };
    let report = pipeline::run(&input, &config).unwrap();

    assert_eq!(report.summary.sensors.len(), 1);
    assert_eq!(report.summary.sensors[0].sensor, "TMP1");
    assert_eq!(report.stats_failures.len(), 1);
    assert_eq!(report.stats_failures[0].0, "TMP2");
    assert_eq!(report.title, "TSV log data");
    assert_eq!(files_in(&out), vec!["2023-01-01T00_10_00_statistics_mixed.tsv"]);
    assert!(report.figures.is_none());
}

#[test]
fn text_sensor_fails_only_the_distribution() {
    let tmp = TempDir::new().unwrap();
    let input = write_input(
        tmp.path(),
        "text.tsv",
        "Date_time\tTMP1\n2023-01-01T00:00:00\tn/a\n2023-01-01T00:10:00\tn/a\n",
    );
    let out = tmp.path().join("reports");

    let report = pipeline::run(&input, &config_into(&out)).unwrap();

    assert!(report.distribution_error().is_some());
    assert!(report.summary.sensors.is_empty());
    assert_eq!(
        files_in(&out),
        vec!["2023-01-01T00_10_00_interactive_plot_text.html"]
    );
}

#[test]
fn nan_readings_do_not_spoil_sensor_statistics() {
    let tmp = TempDir::new().unwrap();
    let input = write_input(
        tmp.path(),
        "gaps.tsv",
        "Date_time\tTMP1\n2023-01-01T00:00:00\t20.0\n2023-01-01T00:01:00\tnan\n2023-01-01T00:02:00\t22.0\n",
    );
    let out = tmp.path().join("reports");

    let config = ReportConfig {
        save_html: false,
        ..config_into(&out)
    };
    let report = pipeline::run(&input, &config).unwrap();

    let tmp1 = &report.summary.sensors[0];
    assert_eq!((tmp1.mean, tmp1.min, tmp1.max, tmp1.count), (21.0, 20.0, 22.0, 2));
    let stats = std::fs::read_to_string(out.join("2023-01-01T00_02_00_statistics_gaps.tsv")).unwrap();
    assert_eq!(stats.lines().nth(1), Some("TMP1\t21.00\t20.00\t22.00\t1.41\t0:02:00"));
}

#[test]
fn reloaded_parquet_export_keeps_its_statistics_delimited() {
    let tmp = TempDir::new().unwrap();
    let input = write_input(tmp.path(), "log.tsv", LOG);
    let first = tmp.path().join("first");
    let config = ReportConfig {
        export_spreadsheets: true,
        save_html: false,
        ..config_into(&first)
    };
    pipeline::run(&input, &config).unwrap();

    let export = first.join("2023-01-01T00_02_00_table_log.parquet");
    let second = tmp.path().join("second");
    let report = pipeline::run(&export, &config_into(&second)).unwrap();

    assert_eq!(report.table.len(), 3);
    assert!(second
        .join("2023-01-01T00_02_00_statistics_2023-01-01T00_02_00_table_log.tsv")
        .is_file());
}

#[test]
fn unwritable_output_aborts_the_run() {
    let tmp = TempDir::new().unwrap();
    let input = write_input(tmp.path(), "log.tsv", LOG);
    let out = tmp.path().join("reports");
    // A directory squatting on the statistics file name.
    std::fs::create_dir_all(out.join("2023-01-01T00_02_00_statistics_log.tsv")).unwrap();

    let err = pipeline::run(&input, &config_into(&out)).unwrap_err();
    assert!(matches!(err, ReportError::Export(_)), "{err}");
    assert!(!out.join("2023-01-01T00_02_00_interactive_plot_log.html").exists());
}
