use super::*;

#[test]
fn defaults_match_legacy_deployment() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 8000);
    assert!(settings.server.addr.ip().is_unspecified());
    assert_eq!(settings.server.max_body_bytes.get(), DEFAULT_MAX_BODY_BYTES);
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(30));
    assert_eq!(settings.renderer.pdf_path, PathBuf::from("wkhtmltopdf"));
    assert_eq!(settings.renderer.image_path, PathBuf::from("wkhtmltoimage"));
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn renderer_paths_can_be_overridden() {
    let mut raw = RawSettings::default();
    raw.renderer.pdf_path = Some(PathBuf::from("/opt/config/wkhtmltopdf"));

    let overrides = ServeOverrides {
        renderer: RendererOverrides {
            pdf_path: Some(PathBuf::from("/usr/local/bin/wkhtmltopdf")),
            image_path: Some(PathBuf::from("/usr/local/bin/wkhtmltoimage")),
        },
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(
        settings.renderer.pdf_path,
        PathBuf::from("/usr/local/bin/wkhtmltopdf")
    );
    assert_eq!(
        settings.renderer.image_path,
        PathBuf::from("/usr/local/bin/wkhtmltoimage")
    );
}

#[test]
fn empty_renderer_path_falls_back_to_bare_name() {
    let mut raw = RawSettings::default();
    raw.renderer.image_path = Some(PathBuf::new());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.renderer.image_path, PathBuf::from("wkhtmltoimage"));
}

#[test]
fn zero_port_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(0);

    let err = Settings::from_raw(raw).expect_err("port zero");
    assert!(matches!(err, LoadError::Invalid { key: "server.port", .. }));
}

#[test]
fn invalid_host_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.host = Some("not a host".to_string());

    let err = Settings::from_raw(raw).expect_err("bad host");
    assert!(matches!(err, LoadError::Invalid { key: "server.addr", .. }));
}

#[test]
fn zero_body_limit_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.max_body_bytes = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero limit");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "server.max_body_bytes",
            ..
        }
    ));
}

#[test]
fn graceful_shutdown_can_be_overridden() {
    let mut raw = RawSettings::default();
    raw.server.graceful_shutdown_seconds = Some(60);

    let overrides = ServeOverrides {
        server_graceful_shutdown_seconds: Some(5),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(5));
}

#[test]
fn zero_graceful_shutdown_is_rejected() {
    let mut raw = RawSettings::default();
    raw.server.graceful_shutdown_seconds = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero shutdown window");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "server.graceful_shutdown_seconds",
            ..
        }
    ));
}

#[test]
fn invalid_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("chatty".to_string());

    let err = Settings::from_raw(raw).expect_err("bad level");
    assert!(matches!(err, LoadError::Invalid { key: "logging.level", .. }));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn parse_serve_flags() {
    let args = CliArgs::parse_from([
        "htmlpress",
        "--port",
        "9100",
        "--host",
        "127.0.0.1",
        "--wkhtmltopdf-path",
        "/bin/wkhtmltopdf",
        "--log-json",
        "yes",
    ]);

    assert_eq!(args.overrides.port, Some(9100));
    assert_eq!(args.overrides.host.as_deref(), Some("127.0.0.1"));
    assert_eq!(
        args.overrides.renderer.pdf_path.as_deref(),
        Some(std::path::Path::new("/bin/wkhtmltopdf"))
    );
    assert_eq!(args.overrides.log_json, Some(true));
}

#[test]
fn non_numeric_port_flag_is_rejected() {
    let result = CliArgs::try_parse_from(["htmlpress", "--port", "eighty"]);
    assert!(result.is_err());
}
