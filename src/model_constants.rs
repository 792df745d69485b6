//! Model id constants

/// Text completion models
pub mod completion {
    pub const TEXT_DAVINCI_003: &str = "text-davinci-003";
    pub const TEXT_CURIE_001: &str = "text-curie-001";
    pub const TEXT_BABBAGE_001: &str = "text-babbage-001";
    pub const TEXT_ADA_001: &str = "text-ada-001";
    /// Current completions-endpoint model
    pub const GPT_3_5_TURBO_INSTRUCT: &str = "gpt-3.5-turbo-instruct";

    /// Default model of a completion block
    pub const DEFAULT: &str = TEXT_CURIE_001;

    pub const ALL: &[&str] = &[
        TEXT_DAVINCI_003,
        TEXT_CURIE_001,
        TEXT_BABBAGE_001,
        TEXT_ADA_001,
        GPT_3_5_TURBO_INSTRUCT,
    ];
}

/// Image generation models
pub mod image {
    pub const DALL_E_2: &str = "dall-e-2";
    pub const DALL_E_3: &str = "dall-e-3";

    pub const ALL: &[&str] = &[DALL_E_2, DALL_E_3];
}
