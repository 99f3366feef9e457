use std::sync::Mutex;

use tempfile::NamedTempFile;

use handlink::classify::ClassifierProfile;
use handlink::config::{EngineConfig, TrackerdConfig};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "HANDLINK_CONFIG",
        "HANDLINK_SOURCE",
        "HANDLINK_TARGET_FPS",
        "HANDLINK_COOLDOWN_SECS",
        "HANDLINK_ADDR",
        "HANDLINK_CLASSIFIER",
        "HANDLINK_LISTEN_ADDR",
        "HANDLINK_PEER_ADDR",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn defaults_apply_without_a_config_file() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = TrackerdConfig::load().expect("load config");
    assert_eq!(cfg.common.source, "stub://hand");
    assert_eq!(cfg.common.frame_size.width, 320);
    assert_eq!(cfg.common.frame_size.height, 240);
    assert_eq!(cfg.common.target_fps, 30);
    assert_eq!(cfg.common.cooldown.as_secs_f64(), 1.0);
    assert_eq!(cfg.addr, "127.0.0.1:12345");
    assert_eq!(cfg.classifier, ClassifierProfile::RuleTable);
    assert_eq!(cfg.common.cycle_delay().as_millis(), 33);

    clear_env();
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "source": "frames.jsonl",
        "frame": { "width": 640, "height": 480 },
        "target_fps": 15,
        "cooldown_secs": 2.5,
        "stream": {
            "addr": "0.0.0.0:9000",
            "classifier": "pinch-open"
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("HANDLINK_CONFIG", file.path());
    std::env::set_var("HANDLINK_SOURCE", "stub://override");
    std::env::set_var("HANDLINK_TARGET_FPS", "10");

    let cfg = TrackerdConfig::load().expect("load config");

    assert_eq!(cfg.common.source, "stub://override");
    assert_eq!(cfg.common.frame_size.width, 640);
    assert_eq!(cfg.common.frame_size.height, 480);
    assert_eq!(cfg.common.target_fps, 10);
    assert_eq!(cfg.common.cooldown.as_secs_f64(), 2.5);
    assert_eq!(cfg.addr, "0.0.0.0:9000");
    assert_eq!(cfg.classifier, ClassifierProfile::PinchOpen);

    clear_env();
}

#[test]
fn stream_daemon_rejects_the_engine_vocabulary() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("HANDLINK_CLASSIFIER", "finger-count");
    let err = TrackerdConfig::load().unwrap_err();
    assert!(format!("{err}").contains("engine profile"));

    clear_env();
}

#[test]
fn engine_config_has_its_own_addresses_and_polls() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "engine": {
            "listen_addr": "127.0.0.1:6006",
            "peer_addr": "127.0.0.1:6005",
            "active_poll_ms": 5,
            "idle_poll_ms": 200
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");
    std::env::set_var("HANDLINK_CONFIG", file.path());
    std::env::set_var("HANDLINK_PEER_ADDR", "10.0.0.2:6005");

    let cfg = EngineConfig::load().expect("load config");
    assert_eq!(cfg.listen_addr, "127.0.0.1:6006");
    assert_eq!(cfg.peer_addr, "10.0.0.2:6005");
    assert_eq!(cfg.active_poll.as_millis(), 5);
    assert_eq!(cfg.idle_poll.as_millis(), 200);

    clear_env();
}

#[test]
fn invalid_numbers_are_rejected() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("HANDLINK_COOLDOWN_SECS", "soon");
    assert!(TrackerdConfig::load().is_err());
    clear_env();

    std::env::set_var("HANDLINK_TARGET_FPS", "0");
    assert!(TrackerdConfig::load().is_err());

    clear_env();
}
