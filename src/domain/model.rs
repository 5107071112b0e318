use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A category of portfolio content that is loaded independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentDomain {
    Home,
    Projects,
    Experiences,
    Skills,
    Stats,
}

impl ContentDomain {
    pub const ALL: [ContentDomain; 5] = [
        ContentDomain::Home,
        ContentDomain::Projects,
        ContentDomain::Experiences,
        ContentDomain::Skills,
        ContentDomain::Stats,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ContentDomain::Home => "home",
            ContentDomain::Projects => "projects",
            ContentDomain::Experiences => "experiences",
            ContentDomain::Skills => "skills",
            ContentDomain::Stats => "stats",
        }
    }
}

impl fmt::Display for ContentDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ContentDomain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentDomain::ALL
            .into_iter()
            .find(|domain| domain.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown content domain: {}", s))
    }
}

/// Where a loaded value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Api,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadResult<T> {
    pub data: T,
    pub source: DataSource,
}

impl<T> LoadResult<T> {
    pub fn api(data: T) -> Self {
        Self {
            data,
            source: DataSource::Api,
        }
    }

    pub fn fallback(data: T) -> Self {
        Self {
            data,
            source: DataSource::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == DataSource::Fallback
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadResult<U> {
        LoadResult {
            data: f(self.data),
            source: self.source,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLinks {
    pub github: String,
    pub linkedin: String,
    pub twitter: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Home {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub avatar_url: Option<String>,
    pub resume_url: Option<String>,
    pub social: SocialLinks,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    pub technologies: Vec<String>,
    pub image_url: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub featured: bool,
}

/// Dates accept `YYYY-MM-DD` or a full RFC 3339 timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: String,
    pub company: String,
    pub role: String,
    #[serde(deserialize_with = "iso_date::deserialize")]
    pub start_date: NaiveDate,
    #[serde(default, deserialize_with = "iso_date::deserialize_option")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
}

mod iso_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{de::Error, Deserialize, Deserializer};

    fn parse(value: &str) -> Result<NaiveDate, String> {
        let value = value.trim();
        value
            .parse::<NaiveDate>()
            .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
            .map_err(|e| format!("invalid date '{}': {}", value, e))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let value = String::deserialize(deserializer)?;
        parse(&value).map_err(D::Error::custom)
    }

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .filter(|value| !value.trim().is_empty())
            .map(|value| parse(&value))
            .transpose()
            .map_err(D::Error::custom)
    }
}

impl Experience {
    pub fn is_current(&self) -> bool {
        self.end_date.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skill {
    pub name: String,
    /// 0-100
    pub level: u8,
}

/// Skills grouped by category. Every category is always present, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skills {
    pub frontend: Vec<Skill>,
    pub backend: Vec<Skill>,
    pub database: Vec<Skill>,
    pub devops: Vec<Skill>,
    pub tools: Vec<Skill>,
}

impl Skills {
    pub fn categories(&self) -> [(&'static str, &[Skill]); 5] {
        [
            ("frontend", &self.frontend),
            ("backend", &self.backend),
            ("database", &self.database),
            ("devops", &self.devops),
            ("tools", &self.tools),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.categories().iter().all(|(_, skills)| skills.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stats {
    pub projects_completed: u32,
    pub years_experience: u32,
    pub technologies: u32,
    pub happy_clients: u32,
}

/// One content domain's value, so heterogeneous domains can travel through the
/// same loader.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "domain", content = "data", rename_all = "lowercase")]
pub enum ContentPayload {
    Home(Home),
    Projects(Vec<Project>),
    Experiences(Vec<Experience>),
    Skills(Skills),
    Stats(Stats),
}

impl ContentPayload {
    pub fn domain(&self) -> ContentDomain {
        match self {
            ContentPayload::Home(_) => ContentDomain::Home,
            ContentPayload::Projects(_) => ContentDomain::Projects,
            ContentPayload::Experiences(_) => ContentDomain::Experiences,
            ContentPayload::Skills(_) => ContentDomain::Skills,
            ContentPayload::Stats(_) => ContentDomain::Stats,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactAck {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminIdentity {
    pub username: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AdminIdentity {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| expires <= now)
    }
}
