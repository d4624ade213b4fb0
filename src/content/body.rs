// src/content/body.rs
// =============================================================================
// This module holds the three kinds of page body and the rules that decide
// how "done" a page is.
//
//   Default   a regular lesson page (main video, summary, exercises, ...)
//   Index     a chapter's _index page (lists the episodes of the chapter)
//   Practice  a practice page (description + challenges)
//
// Every body answers the same three questions:
//   derive_state()       what state does the content actually support?
//   list_issues(state)   what is wrong, given the state the page declares?
//   is_slug_forced()     may the slug differ from the title?
//
// The variant is picked once, when the document is parsed, and never changes.
// The only later mutation is the Index back-fill done by its chapter.
// =============================================================================

use super::sections::{Sections, ROOT};
use super::shortcode::{extract_main, extract_videos, Badge, Main, MainStatus, Videos};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const SECTION_MAIN_VIDEO: &str = "main video";
pub const SECTION_SUMMARY: &str = "summary";
pub const SECTION_TOPICS: &str = "topics";
pub const SECTION_CODE: &str = "code";
pub const SECTION_RELATED_LESSONS: &str = "related lessons";
pub const SECTION_RELATED_VIDEOS: &str = "related videos";
pub const SECTION_RELATED_ARTICLES: &str = "related articles";
pub const SECTION_RELATED_LINKS: &str = "related links";
pub const SECTION_EXERCISES: &str = "exercises";
pub const SECTION_NOTES: &str = "notes";
pub const SECTION_EPISODES: &str = "episodes";
pub const SECTION_DESCRIPTION: &str = "description";
pub const SECTION_RECOMMENDED_CHALLENGES: &str = "recommended challenges";
pub const SECTION_ADDITIONAL_CHALLENGES: &str = "additional challenges";

/// Canonical order of Default body sections
pub const DEFAULT_SECTION_ORDER: &[&str] = &[
    ROOT,
    SECTION_MAIN_VIDEO,
    SECTION_SUMMARY,
    SECTION_TOPICS,
    SECTION_CODE,
    SECTION_RELATED_LESSONS,
    SECTION_RELATED_VIDEOS,
    SECTION_RELATED_ARTICLES,
    SECTION_RELATED_LINKS,
    SECTION_EXERCISES,
    SECTION_NOTES,
];

pub const TAG_USEFUL_WITHOUT_VIDEO: &str = "useful-without-video";
pub const TAG_SLUG_FORCED: &str = "slug-forced";
pub const TAG_NO_EXERCISE: &str = "no-exercise";
pub const TAG_PROJECT: &str = "project";
pub const TAG_PROJECTS: &str = "projects";

/// Front matter archetype that marks a chapter index page
pub const ARCHETYPE_CHAPTER: &str = "chapter";

// Related videos that can stand in for a missing main video
const VIDEO_REPLACEMENTS: &[Badge] = &[Badge::Alternative, Badge::DeepDive, Badge::FullCourse];

/// Completion level of a page, declared or derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Stub,
    Incomplete,
    Complete,
}

impl State {
    pub fn as_str(self) -> &'static str {
        match self {
            State::Stub => "stub",
            State::Incomplete => "incomplete",
            State::Complete => "complete",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for State {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stub" => Ok(State::Stub),
            "incomplete" => Ok(State::Incomplete),
            "complete" => Ok(State::Complete),
            other => Err(format!("unknown state: {other}")),
        }
    }
}

/// A derived state, plus why a higher state was rejected (if it was).
pub type Derivation = (State, Option<String>);

/// Section titles of a Default body in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionTitles(pub Vec<String>);

impl SectionTitles {
    /// First title that is duplicated, unknown, or out of the canonical order.
    pub fn first_out_of_order(&self) -> Option<&str> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.0.len());
        let mut last_index = 0;

        for title in self.0.iter().map(String::as_str) {
            if seen.contains(&title) {
                return Some(title);
            }
            seen.push(title);

            match DEFAULT_SECTION_ORDER.iter().position(|known| *known == title) {
                Some(index) if index >= last_index => last_index = index,
                _ => return Some(title),
            }
        }

        None
    }
}

/// A regular lesson page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultBody {
    pub main: Main,
    pub has_summary: bool,
    pub has_topics: bool,
    pub has_exercises: bool,
    pub related_videos: Videos,
    pub has_related_links: bool,
    pub useful_without_video: bool,
    pub slug_forced: bool,
    pub project: bool,
    pub section_titles: SectionTitles,
}

impl DefaultBody {
    pub fn from_sections(sections: &Sections, tags: &[String]) -> Self {
        let has_tag = |wanted: &str| tags.iter().any(|tag| tag == wanted);

        DefaultBody {
            main: extract_main(sections.content(SECTION_MAIN_VIDEO)),
            has_summary: sections.has_non_empty(SECTION_SUMMARY),
            has_topics: sections.has_non_empty(SECTION_TOPICS),
            has_exercises: sections.has_non_empty(SECTION_EXERCISES)
                || has_tag(TAG_NO_EXERCISE),
            related_videos: extract_videos(sections.content(SECTION_RELATED_VIDEOS), false),
            has_related_links: sections.has_non_empty(SECTION_RELATED_LINKS),
            useful_without_video: has_tag(TAG_USEFUL_WITHOUT_VIDEO),
            slug_forced: has_tag(TAG_SLUG_FORCED),
            project: has_tag(TAG_PROJECT) || has_tag(TAG_PROJECTS),
            section_titles: SectionTitles(sections.titles()),
        }
    }

    pub fn derive_state(&self) -> Derivation {
        let not_complete = match self.complete_rejection() {
            None => return (State::Complete, None),
            Some(reason) => reason,
        };

        match self.incomplete_rejection() {
            None => (State::Incomplete, Some(not_complete.to_string())),
            Some(reason) => (State::Stub, Some(reason.to_string())),
        }
    }

    fn complete_rejection(&self) -> Option<&'static str> {
        if self.main.status != MainStatus::Present {
            return Some("video not present");
        }
        if !self.has_summary {
            return Some("summary section missing");
        }
        if !self.has_exercises {
            return Some("exercises section missing");
        }
        if self.main.has_any(&[Badge::Unchecked]) {
            return Some("main has unchecked videos");
        }
        if self.related_videos.has_any(&[Badge::Unchecked]) {
            return Some("related videos include unchecked videos");
        }
        None
    }

    fn incomplete_rejection(&self) -> Option<&'static str> {
        if self.main.status == MainStatus::Present || self.useful_without_video {
            return None;
        }
        if self.related_videos.has_any(VIDEO_REPLACEMENTS) {
            return None;
        }
        Some("video missing and no alternative, deep-dive or full-course videos")
    }

    pub fn list_issues(&self, declared: Option<State>) -> Vec<String> {
        let mut issues = self.main.issues();
        issues.extend(self.related_videos.issues());

        match self.main.status {
            MainStatus::ReallyMissing if self.useful_without_video => issues.push(
                "main video is NOT REALLY missing (Remove the useful-without-video tag?)"
                    .to_string(),
            ),
            MainStatus::Missing
                if !self.related_videos.has_any(VIDEO_REPLACEMENTS)
                    && !self.useful_without_video =>
            {
                issues.push(
                    "main video is REALLY missing (Add a useful-without-video tag?)".to_string(),
                )
            }
            _ => {}
        }

        issues.extend(state_mismatch(declared, self.derive_state()));

        if let Some(title) = self.section_titles.first_out_of_order() {
            issues.push(format!(
                "sections are not in the correct order, first out of order: {title}"
            ));
        }

        if !self.project {
            if !self.has_summary {
                issues.push("summary section is missing".to_string());
            }
            if !self.has_topics {
                issues.push("topics section is missing".to_string());
            }
        }

        issues
    }
}

/// A chapter index page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexBody {
    pub has_episodes: bool,
    /// Set by the owning chapter once all sibling pages are known
    pub complete_state: Option<State>,
    /// True once the chapter back-fill ran
    pub prepared: bool,
}

impl IndexBody {
    pub fn from_sections(sections: &Sections) -> Self {
        IndexBody {
            has_episodes: sections.has_non_empty(SECTION_EPISODES),
            complete_state: None,
            prepared: false,
        }
    }

    pub fn derive_state(&self) -> Derivation {
        if !self.has_episodes {
            return (State::Stub, Some("no episodes".to_string()));
        }

        match self.complete_state {
            Some(State::Complete) => (State::Complete, None),
            _ => (
                State::Incomplete,
                Some("not every page of the chapter is complete".to_string()),
            ),
        }
    }

    /// Records whether every non-index page of the chapter is complete.
    /// Only the first call has an effect.
    pub fn back_fill(&mut self, every_page_complete: bool) {
        if self.prepared {
            return;
        }
        self.prepared = true;

        if every_page_complete {
            self.complete_state = Some(State::Complete);
        }
    }

    pub fn list_issues(&self, declared: Option<State>) -> Vec<String> {
        // before the back-fill the derived state is not known yet
        if !self.prepared {
            return Vec::new();
        }
        state_mismatch(declared, self.derive_state())
            .into_iter()
            .collect()
    }
}

/// A practice page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PracticeBody {
    pub has_description: bool,
    pub has_recommended_challenges: bool,
    pub has_additional_challenges: bool,
}

impl PracticeBody {
    pub fn from_sections(sections: &Sections) -> Self {
        PracticeBody {
            has_description: sections.has_non_empty(SECTION_DESCRIPTION),
            has_recommended_challenges: sections.has_non_empty(SECTION_RECOMMENDED_CHALLENGES),
            has_additional_challenges: sections.has_non_empty(SECTION_ADDITIONAL_CHALLENGES),
        }
    }

    pub fn derive_state(&self) -> Derivation {
        if !self.has_description {
            return (State::Stub, Some("no description".to_string()));
        }
        if self.has_recommended_challenges && self.has_additional_challenges {
            return (State::Complete, None);
        }
        (
            State::Incomplete,
            Some("missing recommended or additional challenges".to_string()),
        )
    }

    pub fn list_issues(&self, declared: Option<State>) -> Vec<String> {
        state_mismatch(declared, self.derive_state())
            .into_iter()
            .collect()
    }
}

/// The body of a page, one of three kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Default(DefaultBody),
    Index(IndexBody),
    Practice(PracticeBody),
}

impl Body {
    /// Picks the variant: chapter archetype first, then a non-empty
    /// description section, otherwise a regular page.
    pub fn select(archetype: &str, sections: &Sections, tags: &[String]) -> Self {
        if archetype == ARCHETYPE_CHAPTER {
            Body::Index(IndexBody::from_sections(sections))
        } else if sections.has_non_empty(SECTION_DESCRIPTION) {
            Body::Practice(PracticeBody::from_sections(sections))
        } else {
            Body::Default(DefaultBody::from_sections(sections, tags))
        }
    }

    pub fn derive_state(&self) -> Derivation {
        match self {
            Body::Default(body) => body.derive_state(),
            Body::Index(body) => body.derive_state(),
            Body::Practice(body) => body.derive_state(),
        }
    }

    pub fn list_issues(&self, declared: Option<State>) -> Vec<String> {
        match self {
            Body::Default(body) => body.list_issues(declared),
            Body::Index(body) => body.list_issues(declared),
            Body::Practice(body) => body.list_issues(declared),
        }
    }

    pub fn is_slug_forced(&self) -> bool {
        match self {
            Body::Default(body) => body.slug_forced,
            Body::Index(_) | Body::Practice(_) => false,
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Body::Index(_))
    }
}

fn state_mismatch(declared: Option<State>, (derived, reason): Derivation) -> Option<String> {
    if declared == Some(derived) {
        return None;
    }

    Some(format!(
        "state mismatch. got: {}, want: {}, reason: {}",
        declared.map(State::as_str).unwrap_or("none"),
        derived,
        reason.as_deref().unwrap_or("unknown"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn present_main() -> Main {
        extract_main("{{< time 10 >}}\n{{< youtube abc >}}")
    }

    fn complete_body() -> DefaultBody {
        DefaultBody {
            main: present_main(),
            has_summary: true,
            has_topics: true,
            has_exercises: true,
            section_titles: SectionTitles(vec![
                SECTION_MAIN_VIDEO.to_string(),
                SECTION_SUMMARY.to_string(),
                SECTION_TOPICS.to_string(),
                SECTION_EXERCISES.to_string(),
            ]),
            ..DefaultBody::default()
        }
    }

    #[test]
    fn test_state_round_trip_names() {
        assert_eq!("complete".parse::<State>(), Ok(State::Complete));
        assert!("done".parse::<State>().is_err());
        assert_eq!(State::Incomplete.to_string(), "incomplete");
    }

    #[test]
    fn test_default_complete() {
        let body = complete_body();
        assert_eq!(body.derive_state(), (State::Complete, None));
        assert!(body.list_issues(Some(State::Complete)).is_empty());
    }

    #[test]
    fn test_default_unchecked_is_incomplete() {
        let mut body = complete_body();
        body.main = extract_main(
            "{{< time 10 >}} {{<badge-unchecked>}}\n{{< youtube abc >}}",
        );
        assert_eq!(
            body.derive_state(),
            (State::Incomplete, Some("main has unchecked videos".to_string()))
        );
    }

    #[test]
    fn test_unchecked_related_video_is_incomplete() {
        let mut body = complete_body();
        body.related_videos = extract_videos(
            "\n### Talk\n\n{{< time 20 >}} {{<badge-extra>}} {{<badge-unchecked>}}\n{{< youtube abc >}}\n",
            false,
        );
        assert_eq!(body.related_videos.len(), 1);
        assert_eq!(
            body.derive_state(),
            (
                State::Incomplete,
                Some("related videos include unchecked videos".to_string())
            )
        );
    }

    #[test]
    fn test_default_stub_and_incomplete_paths() {
        let body = DefaultBody::default();
        let (state, reason) = body.derive_state();
        assert_eq!(state, State::Stub);
        assert_eq!(
            reason.as_deref(),
            Some("video missing and no alternative, deep-dive or full-course videos")
        );

        let body = DefaultBody {
            useful_without_video: true,
            ..DefaultBody::default()
        };
        assert_eq!(
            body.derive_state(),
            (State::Incomplete, Some("video not present".to_string()))
        );

        let body = DefaultBody {
            related_videos: extract_videos(
                "### Alt\n\n{{< time 20 >}} {{<badge-alternative>}}\n\n{{< youtube x >}}\n",
                false,
            ),
            ..DefaultBody::default()
        };
        assert_eq!(body.derive_state().0, State::Incomplete);
    }

    #[test]
    fn test_declared_state_only_changes_the_mismatch_issue() {
        let body = DefaultBody {
            has_exercises: false,
            ..complete_body()
        };

        let derived = body.derive_state();
        for declared in [None, Some(State::Stub), Some(State::Incomplete), Some(State::Complete)] {
            assert_eq!(body.derive_state(), derived);

            let mismatch = body
                .list_issues(declared)
                .into_iter()
                .any(|issue| issue.starts_with("state mismatch"));
            assert_eq!(mismatch, declared != Some(State::Incomplete));
        }
    }

    #[test]
    fn test_mismatch_message() {
        let body = DefaultBody::default();
        let issues = body.list_issues(Some(State::Complete));
        assert!(issues.contains(
            &"state mismatch. got: complete, want: stub, reason: video missing and no alternative, deep-dive or full-course videos"
                .to_string()
        ));
    }

    #[test]
    fn test_section_order() {
        let titles = |names: &[&str]| SectionTitles(names.iter().map(|s| s.to_string()).collect());

        assert_eq!(
            titles(&["main video", "summary", "topics", "exercises"]).first_out_of_order(),
            None
        );
        assert_eq!(
            titles(&["summary", "topics", "main video"]).first_out_of_order(),
            Some("main video")
        );
        assert_eq!(
            titles(&["summary", "summary"]).first_out_of_order(),
            Some("summary")
        );
        assert_eq!(
            titles(&["summary", "homework"]).first_out_of_order(),
            Some("homework")
        );
    }

    #[test]
    fn test_main_video_missing_issues() {
        let body = DefaultBody {
            main: extract_main("{{< main-missing >}}"),
            ..complete_body()
        };
        assert!(body
            .list_issues(None)
            .contains(&"main video is REALLY missing (Add a useful-without-video tag?)".to_string()));

        let body = DefaultBody {
            main: extract_main("{{< main-really-missing >}}"),
            useful_without_video: true,
            ..complete_body()
        };
        assert!(body.list_issues(None).contains(
            &"main video is NOT REALLY missing (Remove the useful-without-video tag?)".to_string()
        ));
    }

    #[test]
    fn test_project_skips_summary_and_topics() {
        let body = DefaultBody::default();
        let issues = body.list_issues(Some(State::Stub));
        assert!(issues.contains(&"summary section is missing".to_string()));
        assert!(issues.contains(&"topics section is missing".to_string()));

        let body = DefaultBody {
            project: true,
            ..DefaultBody::default()
        };
        assert!(body.list_issues(Some(State::Stub)).is_empty());
    }

    #[test]
    fn test_index_without_episodes_stays_stub() {
        let mut body = IndexBody::default();
        body.back_fill(true);
        assert_eq!(body.derive_state(), (State::Stub, Some("no episodes".to_string())));
    }

    #[test]
    fn test_index_back_fill_is_idempotent() {
        let mut body = IndexBody {
            has_episodes: true,
            ..IndexBody::default()
        };
        assert_eq!(body.derive_state().0, State::Incomplete);
        assert!(body.list_issues(Some(State::Complete)).is_empty());

        body.back_fill(true);
        assert_eq!(body.derive_state(), (State::Complete, None));

        body.back_fill(false);
        assert_eq!(body.derive_state(), (State::Complete, None));
        assert!(body.list_issues(Some(State::Complete)).is_empty());
    }

    #[test]
    fn test_practice_states() {
        let mut body = PracticeBody::default();
        assert_eq!(body.derive_state().0, State::Stub);

        body.has_description = true;
        body.has_recommended_challenges = true;
        assert_eq!(body.derive_state().0, State::Incomplete);
        assert_eq!(body.list_issues(Some(State::Incomplete)), Vec::<String>::new());

        body.has_additional_challenges = true;
        assert_eq!(body.derive_state(), (State::Complete, None));
    }

    #[test]
    fn test_slug_forced_only_on_default_bodies() {
        let body = Body::Default(DefaultBody {
            slug_forced: true,
            ..DefaultBody::default()
        });
        assert!(body.is_slug_forced());
        assert!(!Body::Index(IndexBody::default()).is_slug_forced());
        assert!(!Body::Practice(PracticeBody::default()).is_slug_forced());
    }

    #[test]
    fn test_body_selection_order() {
        let sections = Sections::extract("Description\n-----------\n\nDo it.\n\nEpisodes\n--------\n\n- a\n");

        assert!(matches!(Body::select("chapter", &sections, &[]), Body::Index(_)));
        assert!(matches!(Body::select("", &sections, &[]), Body::Practice(_)));

        let sections = Sections::extract("Summary\n-------\n\nx\n");
        assert!(matches!(Body::select("", &sections, &[]), Body::Default(_)));
    }
}
