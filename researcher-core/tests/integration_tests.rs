//! Integration tests for researcher-core infrastructure

use researcher_core::{
    config_error, lint_env_file, not_found_error, parse_env_lines, render_template,
    search_error, validation_error, ErrorContext, LlmProvider, ResearchError, ResearcherConfig,
    SearchProvider,
};
use std::io::Write;

#[test]
fn test_error_macros_carry_context() {
    let error = search_error!("index unavailable", "azure", "test_component");
    match &error {
        ResearchError::Search {
            message,
            provider,
            context,
            ..
        } => {
            assert_eq!(message, "index unavailable");
            assert_eq!(provider, "azure");
            assert_eq!(context.component, "test_component");
            assert!(!context.error_id.is_empty());
        }
        _ => panic!("Expected Search error"),
    }
    assert!(!error.is_recoverable());

    // Logging should not panic without a subscriber
    error.log();

    let config = config_error!("Missing key", "test");
    assert!(!config.is_recoverable());
    assert!(config.retry_delay_ms().is_none());
    assert!(!config.context().unwrap().recovery_suggestions.is_empty());

    let validation = validation_error!("bad value", "SEARCH_PROVIDER", "test");
    assert!(matches!(
        validation,
        ResearchError::Validation { field: Some(ref f), .. } if f == "SEARCH_PROVIDER"
    ));

    let missing = not_found_error!("deck.pptx", "test");
    assert_eq!(missing.to_string(), "Resource not found: deck.pptx");
}

#[test]
fn test_rate_limit_retry_delay() {
    let error = ResearchError::RateLimit {
        message: "slow down".to_string(),
        retry_after_ms: Some(1500),
        context: ErrorContext::new("test"),
    };
    assert!(error.is_recoverable());
    assert_eq!(error.retry_delay_ms(), Some(1500));
}

#[test]
fn test_config_from_env_file_on_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "# local setup\n\
         DR_ANTHROPIC_API_KEY=sk-ant-1234\n\
         SERPER_API_KEY=serper-key\n\
         SEARCH_PROVIDER=serper  # serper or openai\n\
         REASONING_MODEL_PROVIDER=anthropic\n\
         REASONING_MODEL=claude-3-7-sonnet-latest\n\
         MAIN_MODEL_PROVIDER=anthropic\n\
         MAIN_MODEL=claude-3-5-sonnet-latest\n\
         FAST_MODEL_PROVIDER=anthropic\n\
         FAST_MODEL=claude-3-5-haiku-latest\n"
    )
    .unwrap();

    let content = std::fs::read_to_string(file.path()).unwrap();
    let lint = lint_env_file(&content);
    assert!(lint.is_valid(), "lint errors: {:?}", lint.errors);
    assert!(!lint.is_complete());

    let parsed = parse_env_lines(&content);
    let config = ResearcherConfig::from_env(&parsed.to_env()).unwrap();

    assert_eq!(config.search.provider, SearchProvider::Serper);
    assert_eq!(config.models.main.provider, LlmProvider::Anthropic);
    assert_eq!(config.models.fast.model, "claude-3-5-haiku-latest");
    assert_eq!(
        config.api_keys.get(LlmProvider::Anthropic),
        Some("sk-ant-1234")
    );
    assert!(config.validate().is_valid());
}

#[test]
fn test_template_only_config_is_invalid() {
    // Placeholders count as unset, so the bare template lacks credentials.
    let parsed = parse_env_lines(&render_template());
    let config = ResearcherConfig::from_env(&parsed.to_env()).unwrap();

    assert!(config.api_keys.get(LlmProvider::OpenAi).is_none());
    assert!(config.azure.is_none());
    let report = config.validate();
    assert!(!report.is_valid());
    assert!(report.errors.iter().any(|e| e.field == "SERPER_API_KEY"));
}
