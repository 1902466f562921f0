use super::*;
use serial_test::serial;
use std::env;
use std::time::Duration;
use tempfile::TempDir;

const ALL_VARS: &[&str] = &[
    "CITEGUARD_RETRIEVER_URL",
    "CITEGUARD_SPARSE_RETRIEVER_URL",
    "CITEGUARD_EMBEDDER_URL",
    "CITEGUARD_EMBED_MODEL",
    "CITEGUARD_LLM_MODEL",
    "CITEGUARD_CHUNKS_DIR",
    "CITEGUARD_TOP_K",
    "CITEGUARD_RETRIEVER_TIMEOUT_MS",
    "CITEGUARD_LLM_TIMEOUT_MS",
    "CITEGUARD_EMBEDDER_TIMEOUT_MS",
    "CITEGUARD_ATTRIBUTION_THRESHOLD",
    "CITEGUARD_CONFIDENCE_THRESHOLD",
    "CITEGUARD_PRECISION_THRESHOLD",
    "CITEGUARD_MIN_DISTINCT_PAPERS",
    "CITEGUARD_MIN_EVIDENCE",
    "CITEGUARD_MAX_ATTEMPTS",
    "CITEGUARD_RRF_K",
    "CITEGUARD_ANSWER_MODE",
];

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    clear_citeguard_env();
    // SAFETY: Test code only, serialized with #[serial].
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    clear_citeguard_env();
    result
}

fn clear_citeguard_env() {
    // SAFETY: Test code only, serialized with #[serial].
    for key in ALL_VARS {
        unsafe { env::remove_var(key) };
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.retriever_url, "http://localhost:8000");
    assert!(config.sparse_retriever_url.is_none());
    assert!(config.embedder_url.is_none());
    assert!(config.chunks_dir.is_none());
    assert_eq!(config.top_k, 8);
    assert_eq!(config.rrf_k, 60);
    assert_eq!(config.min_evidence, 3);
    assert_eq!(config.max_attempts, 2);
    assert_eq!(config.llm_timeout, Duration::from_secs(60));
    assert_eq!(config.answer_mode, AnswerMode::Strict);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    let config = with_env_vars(&[], || Config::from_env().expect("should parse with defaults"));
    assert_eq!(config.retriever_url, DEFAULT_RETRIEVER_URL);
    assert_eq!(config.attribution_threshold, 0.25);
}

#[test]
#[serial]
fn test_from_env_overrides() {
    let config = with_env_vars(
        &[
            ("CITEGUARD_RETRIEVER_URL", "http://dense:9000"),
            ("CITEGUARD_SPARSE_RETRIEVER_URL", "http://bm25:9001"),
            ("CITEGUARD_EMBEDDER_URL", "  "),
            ("CITEGUARD_TOP_K", "12"),
            ("CITEGUARD_LLM_TIMEOUT_MS", "1500"),
            ("CITEGUARD_CONFIDENCE_THRESHOLD", "0.4"),
            ("CITEGUARD_MAX_ATTEMPTS", "4"),
            ("CITEGUARD_ANSWER_MODE", "synthesis"),
        ],
        || Config::from_env().expect("should parse overrides"),
    );

    assert_eq!(config.retriever_url, "http://dense:9000");
    assert_eq!(config.sparse_retriever_url.as_deref(), Some("http://bm25:9001"));
    assert!(config.embedder_url.is_none(), "blank values count as unset");
    assert_eq!(config.top_k, 12);
    assert_eq!(config.llm_timeout, Duration::from_millis(1500));
    assert!((config.confidence_threshold - 0.4).abs() < f32::EPSILON);
    assert_eq!(config.max_attempts, 4);
    assert_eq!(config.answer_mode, AnswerMode::Synthesis);
}

#[test]
#[serial]
fn test_from_env_rejects_unparsable_numbers() {
    let result = with_env_vars(&[("CITEGUARD_TOP_K", "eight")], Config::from_env);
    assert!(matches!(
        result,
        Err(ConfigError::ParseError {
            name: "CITEGUARD_TOP_K",
            ..
        })
    ));

    let result = with_env_vars(&[("CITEGUARD_ANSWER_MODE", "creative")], Config::from_env);
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn test_validate_ranges() {
    let bad_threshold = Config {
        attribution_threshold: 1.5,
        ..Config::default()
    };
    assert!(matches!(
        bad_threshold.validate(),
        Err(ConfigError::InvalidValue {
            name: "attribution_threshold",
            ..
        })
    ));

    let zero_attempts = Config {
        max_attempts: 0,
        ..Config::default()
    };
    assert!(zero_attempts.validate().is_err());

    let zero_timeout = Config {
        retriever_timeout: Duration::ZERO,
        ..Config::default()
    };
    assert!(zero_timeout.validate().is_err());
}

#[test]
fn test_validate_chunks_dir() {
    let dir = TempDir::new().unwrap();

    let ok = Config {
        chunks_dir: Some(dir.path().to_path_buf()),
        ..Config::default()
    };
    assert!(ok.validate().is_ok());

    let missing = Config {
        chunks_dir: Some(dir.path().join("missing")),
        ..Config::default()
    };
    assert!(matches!(missing.validate(), Err(ConfigError::PathNotFound { .. })));

    let file = dir.path().join("file.json");
    std::fs::write(&file, "{}").unwrap();
    let not_dir = Config {
        chunks_dir: Some(file),
        ..Config::default()
    };
    assert!(matches!(not_dir.validate(), Err(ConfigError::NotADirectory { .. })));
}

#[test]
fn test_orchestrator_config_mapping() {
    let config = Config {
        min_evidence: 5,
        max_attempts: 3,
        confidence_threshold: 0.3,
        min_distinct_papers: 1,
        attribution_threshold: 0.4,
        answer_mode: AnswerMode::Synthesis,
        ..Config::default()
    };

    let orch = config.orchestrator_config();
    assert_eq!(orch.min_evidence, 5);
    assert_eq!(orch.max_attempts, 3);
    assert_eq!(orch.mode, AnswerMode::Synthesis);
    assert!((orch.attribution.threshold - 0.4).abs() < f32::EPSILON);
    assert!((orch.refusal.confidence_threshold - 0.3).abs() < f32::EPSILON);
    assert_eq!(orch.refusal.min_distinct_papers, 1);
    assert!(orch.validate().is_ok());
}

#[test]
#[serial]
fn test_recall_depth_follows_top_k() {
    let config = Config {
        top_k: 25,
        ..Config::default()
    };
    assert_eq!(config.orchestrator_config().confidence.recall_k, 25);

    let from_env = with_env_vars(&[("CITEGUARD_TOP_K", "12")], Config::from_env).unwrap();
    assert_eq!(from_env.orchestrator_config().confidence.recall_k, 12);
}
