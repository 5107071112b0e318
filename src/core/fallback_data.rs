//! Static content used when live data cannot be obtained in time.

use crate::domain::model::{
    ContentDomain, ContentPayload, Experience, Home, Project, Skills, SocialLinks, Stats,
};

pub fn fallback_home() -> Home {
    Home {
        name: "Portfolio".to_string(),
        title: "Software Developer".to_string(),
        bio: String::new(),
        avatar_url: None,
        resume_url: None,
        social: SocialLinks::default(),
    }
}

pub fn fallback_projects() -> Vec<Project> {
    Vec::new()
}

pub fn fallback_experiences() -> Vec<Experience> {
    Vec::new()
}

pub fn fallback_skills() -> Skills {
    Skills::default()
}

pub fn fallback_stats() -> Stats {
    Stats::default()
}

pub fn fallback_for(domain: ContentDomain) -> ContentPayload {
    match domain {
        ContentDomain::Home => ContentPayload::Home(fallback_home()),
        ContentDomain::Projects => ContentPayload::Projects(fallback_projects()),
        ContentDomain::Experiences => ContentPayload::Experiences(fallback_experiences()),
        ContentDomain::Skills => ContentPayload::Skills(fallback_skills()),
        ContentDomain::Stats => ContentPayload::Stats(fallback_stats()),
    }
}

/// Lookup by domain key; `None` for keys that name no domain.
pub fn fallback_for_key(key: &str) -> Option<ContentPayload> {
    key.parse::<ContentDomain>().ok().map(fallback_for)
}
