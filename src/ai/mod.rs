pub mod suggestion_service;

pub use suggestion_service::{
    parse_suggestion_json, GroupSuggester, GroupSuggestion, OllamaSuggester, SuggestionRequest,
};
