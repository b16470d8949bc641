//! Article description decoding and visibility policy.

use serde::{Deserialize, Deserializer, de};

/// Structured form of a front matter block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Description {
    pub title: String,
    /// Qiita tags, in order. Absent means no tags.
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default, deserialize_with = "yaml_bool")]
    pub published: bool,
}

/// Accepts YAML 1.1 boolean words (`yes`, `off`, ...) on top of `true`/`false`.
fn yaml_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Word(String),
    }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(false),
        Some(Flag::Bool(value)) => Ok(value),
        Some(Flag::Word(word)) => match word.to_ascii_lowercase().as_str() {
            "yes" | "on" | "true" => Ok(true),
            "no" | "off" | "false" => Ok(false),
            _ => Err(de::Error::invalid_value(
                de::Unexpected::Str(&word),
                &"a boolean such as true, false, yes or no",
            )),
        },
    }
}

impl Description {
    /// Decodes a front matter block as YAML.
    pub fn from_yaml(block: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(block)
    }
}

/// Whether an article is private and whether its creation is announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    pub private: bool,
    /// Qiita's `tweet` flag. Only sent on create.
    pub announce: bool,
}

impl Visibility {
    /// Articles are public only when marked published outside development.
    pub fn resolve(published: bool, development: bool) -> Self {
        let private = development || !published;
        Self {
            private,
            announce: !private,
        }
    }
}
