// src/content/shortcode.rs
// =============================================================================
// This module recognises the Hugo-style shortcodes embedded in section text
// and turns them into video metadata.
//
// Shortcodes we care about:
//   {{< main-missing >}}          main video is missing
//   {{< main-really-missing >}}   main video is missing and nothing replaces it
//   {{< youtube ID >}}            an embedded video (also youtube-button)
//   {{< time 12 >}}               length of the video in minutes
//   {{< badge-extra >}}           a badge classifying the video
//
// A "related videos" section holds many videos, each under its own ###/####/
// ##### sub-heading. Every sub-block is parsed on its own into a `Video`.
//
// Nothing in here fails. Problems are recorded as issue strings on the Video
// they were found in.
// =============================================================================

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Videos this long (in minutes) need a full-course or fun badge
pub const FULL_COURSE_MIN_MINUTES: u32 = 119;
/// Extra videos longer than this should be deep-dives
pub const EXTRA_MAX_MINUTES: u32 = 60;
/// Deep-dive videos shorter than this should be extras
pub const DEEP_DIVE_MIN_MINUTES: u32 = 30;

static MISSING: OnceLock<Regex> = OnceLock::new();
static REALLY_MISSING: OnceLock<Regex> = OnceLock::new();
static YOUTUBE: OnceLock<Regex> = OnceLock::new();
static TIME: OnceLock<Regex> = OnceLock::new();
static BADGE: OnceLock<Regex> = OnceLock::new();
static SUB_HEADING: OnceLock<Regex> = OnceLock::new();

fn missing_regex() -> &'static Regex {
    MISSING.get_or_init(|| Regex::new(r"\{\{<\s*main-missing\s*>\}\}").expect("missing regex"))
}

fn really_missing_regex() -> &'static Regex {
    REALLY_MISSING.get_or_init(|| {
        Regex::new(r"\{\{<\s*main-really-missing\s*>\}\}").expect("really missing regex")
    })
}

fn youtube_regex() -> &'static Regex {
    YOUTUBE.get_or_init(|| {
        Regex::new(r"\{\{<\s*youtube(-button)?\s+([^>]*)\s*>\}\}").expect("youtube regex")
    })
}

fn time_regex() -> &'static Regex {
    TIME.get_or_init(|| Regex::new(r"\{\{<\s*time\s+(\S+?)\s*>\}\}").expect("time regex"))
}

fn badge_regex() -> &'static Regex {
    BADGE.get_or_init(|| Regex::new(r"\{\{<\s*badge-(\S*?)\s*>\}\}").expect("badge regex"))
}

fn sub_heading_regex() -> &'static Regex {
    SUB_HEADING.get_or_init(|| Regex::new(r"\n#{3,5} .*\n").expect("sub heading regex"))
}

/// Classification of a video entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Badge {
    // level badges, at most one per video
    Alternative,
    Extra,
    FullCourse,
    DeepDive,
    Summary,
    MustSee,
    Fun,
    Hint,
    // modifiers
    Unchecked,
    Audio,
    NoEmbed,
    // difficulty, accepted and ignored
    Easy,
    Medium,
    Hard,
}

impl Badge {
    pub fn from_name(name: &str) -> Option<Badge> {
        let badge = match name {
            "alternative" => Badge::Alternative,
            "extra" => Badge::Extra,
            "full-course" => Badge::FullCourse,
            "deep-dive" => Badge::DeepDive,
            "summary" => Badge::Summary,
            "must-see" => Badge::MustSee,
            "fun" => Badge::Fun,
            "hint" => Badge::Hint,
            "unchecked" => Badge::Unchecked,
            "audio" => Badge::Audio,
            "no-embed" => Badge::NoEmbed,
            "easy" => Badge::Easy,
            "medium" => Badge::Medium,
            "hard" => Badge::Hard,
            _ => return None,
        };
        Some(badge)
    }

    pub fn name(self) -> &'static str {
        match self {
            Badge::Alternative => "alternative",
            Badge::Extra => "extra",
            Badge::FullCourse => "full-course",
            Badge::DeepDive => "deep-dive",
            Badge::Summary => "summary",
            Badge::MustSee => "must-see",
            Badge::Fun => "fun",
            Badge::Hint => "hint",
            Badge::Unchecked => "unchecked",
            Badge::Audio => "audio",
            Badge::NoEmbed => "no-embed",
            Badge::Easy => "easy",
            Badge::Medium => "medium",
            Badge::Hard => "hard",
        }
    }

    pub fn is_level(self) -> bool {
        matches!(
            self,
            Badge::Alternative
                | Badge::Extra
                | Badge::FullCourse
                | Badge::DeepDive
                | Badge::Summary
                | Badge::MustSee
                | Badge::Fun
                | Badge::Hint
        )
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Badges of one video, in first-seen order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Badges(Vec<Badge>);

impl Badges {
    pub fn insert(&mut self, badge: Badge) {
        if !self.0.contains(&badge) {
            self.0.push(badge);
        }
    }

    /// True if any of `badges` is present
    pub fn has_any(&self, badges: &[Badge]) -> bool {
        self.0.iter().any(|badge| badges.contains(badge))
    }

    /// True if `badge` is the one and only badge
    pub fn is_only(&self, badge: Badge) -> bool {
        self.0 == [badge]
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Badge> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Badge> for Badges {
    fn from_iter<I: IntoIterator<Item = Badge>>(iter: I) -> Self {
        let mut badges = Badges::default();
        for badge in iter {
            badges.insert(badge);
        }
        badges
    }
}

impl fmt::Display for Badges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|b| b.name()).collect();
        f.write_str(&names.join(", "))
    }
}

/// One video entry and what was wrong with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Video {
    pub badges: Badges,
    pub issues: Vec<String>,
    pub minutes: u32,
    pub valid: bool,
}

/// All videos of a section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Videos(pub Vec<Video>);

impl Videos {
    pub fn issues(&self) -> Vec<String> {
        self.0.iter().flat_map(|v| v.issues.iter().cloned()).collect()
    }

    /// True if any video carries any of `badges`
    pub fn has_any(&self, badges: &[Badge]) -> bool {
        self.0.iter().any(|v| v.badges.has_any(badges))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// State of a page's main video slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MainStatus {
    Missing,
    ReallyMissing,
    Present,
    Problem,
}

impl fmt::Display for MainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MainStatus::Missing => "missing",
            MainStatus::ReallyMissing => "really missing",
            MainStatus::Present => "present",
            MainStatus::Problem => "problem",
        };
        f.write_str(text)
    }
}

/// The main video slot of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Main {
    pub status: MainStatus,
    pub videos: Videos,
}

impl Default for Main {
    fn default() -> Self {
        Main {
            status: MainStatus::Problem,
            videos: Videos::default(),
        }
    }
}

impl Main {
    pub fn has_any(&self, badges: &[Badge]) -> bool {
        self.videos.has_any(badges)
    }

    pub fn issues(&self) -> Vec<String> {
        self.videos.issues()
    }
}

/// Reads the main video section.
///
/// Missing markers win over an embed; both missing markers at once, or no
/// signal at all, is a `Problem`.
pub fn extract_main(content: &str) -> Main {
    let missing = missing_regex().is_match(content);
    let really_missing = really_missing_regex().is_match(content);
    let embedded = youtube_regex().is_match(content);

    let status = match (missing, really_missing) {
        (true, true) => MainStatus::Problem,
        (true, false) => MainStatus::Missing,
        (false, true) => MainStatus::ReallyMissing,
        (false, false) if embedded => MainStatus::Present,
        (false, false) => MainStatus::Problem,
    };

    let videos = if embedded {
        extract_videos(content, true)
    } else {
        Videos::default()
    };

    Main { status, videos }
}

/// Splits `content` on sub-headings and parses every block into a video.
///
/// Blocks without any shortcode are commentary and are dropped.
/// `badge_optional` allows videos without a badge (main video).
pub fn extract_videos(content: &str, badge_optional: bool) -> Videos {
    if content.trim().is_empty() {
        return Videos::default();
    }

    let padded = format!("\n{content}");
    let videos = sub_heading_regex()
        .split(&padded)
        .filter(|block| !block.trim().is_empty())
        .filter_map(|block| extract_video(block, badge_optional))
        .collect();

    Videos(videos)
}

/// Parses a single video block. `None` means the block is not a video.
pub fn extract_video(content: &str, badge_optional: bool) -> Option<Video> {
    let mut issues = Vec::new();

    let time = extract_time(content);
    issues.extend(time.issues);

    let badges = extract_badges(content, badge_optional);
    issues.extend(badges.issues);

    let embeds = extract_youtube(content, badges.no_embed);
    issues.extend(embeds.issues);

    if time.offset.is_none()
        && badges.offset.is_none()
        && embeds.count == 0
        && time.minutes == 0
    {
        return None;
    }

    if let (Some(badge_at), Some(time_at)) = (badges.offset, time.offset) {
        if badge_at < time_at {
            issues.push("badge should be placed after time".to_string());
        }
    }

    issues.extend(duration_issue(time.minutes, &badges.badges));

    Some(Video {
        badges: badges.badges,
        issues,
        minutes: time.minutes,
        valid: true,
    })
}

// At most one duration rule fires, checked from the longest videos down.
fn duration_issue(minutes: u32, badges: &Badges) -> Option<String> {
    if badges.is_empty() || minutes == 0 {
        return None;
    }

    let wanted = if minutes >= FULL_COURSE_MIN_MINUTES
        && !badges.has_any(&[Badge::FullCourse, Badge::Fun])
    {
        "full-course"
    } else if minutes > EXTRA_MAX_MINUTES && badges.is_only(Badge::Extra) {
        "deep-dive"
    } else if minutes < DEEP_DIVE_MIN_MINUTES && badges.has_any(&[Badge::DeepDive]) {
        "extra"
    } else {
        return None;
    };

    Some(format!(
        "badges should have {wanted}, but do not. badges: {badges}"
    ))
}

struct TimeScan {
    minutes: u32,
    offset: Option<usize>,
    issues: Vec<String>,
}

fn extract_time(content: &str) -> TimeScan {
    let mut issues = Vec::new();
    let matches: Vec<_> = time_regex().captures_iter(content).collect();

    let Some(first) = matches.first() else {
        issues.push("missing time shortcode".to_string());
        return TimeScan {
            minutes: 0,
            offset: None,
            issues,
        };
    };

    let raw = &first[1];
    let minutes = raw.parse::<u32>().unwrap_or_else(|_| {
        issues.push(format!("failed to parse duration: {raw}"));
        0
    });

    if matches.len() > 1 {
        issues.push("multiple time shortcodes found".to_string());
    }

    TimeScan {
        minutes,
        offset: first.get(0).map(|m| m.start()),
        issues,
    }
}

struct BadgeScan {
    badges: Badges,
    no_embed: bool,
    offset: Option<usize>,
    issues: Vec<String>,
}

fn extract_badges(content: &str, badge_optional: bool) -> BadgeScan {
    let mut badges = Badges::default();
    let mut issues = Vec::new();
    let mut no_embed = false;
    let mut level: Option<Badge> = None;
    let mut offset = None;

    for captures in badge_regex().captures_iter(content) {
        if offset.is_none() {
            offset = captures.get(0).map(|m| m.start());
        }

        let name = &captures[1];
        let Some(badge) = Badge::from_name(name) else {
            issues.push(format!("unknown badge: '{name}'"));
            continue;
        };

        match badge {
            Badge::NoEmbed => no_embed = true,
            Badge::Unchecked => badges.insert(badge),
            _ if badge.is_level() => {
                if level.is_some() {
                    issues.push(format!("unexpected badge shortcode found: {badge}"));
                } else {
                    level = Some(badge);
                }
                badges.insert(badge);
            }
            // audio and difficulty badges are allowed but carry no meaning here
            _ => {}
        }
    }

    if badges.is_empty() && !badge_optional {
        issues.push("missing badge shortcode".to_string());
    }

    BadgeScan {
        badges,
        no_embed,
        offset,
        issues,
    }
}

struct EmbedScan {
    count: usize,
    issues: Vec<String>,
}

fn extract_youtube(content: &str, no_embed: bool) -> EmbedScan {
    let count = youtube_regex().find_iter(content).count();
    let mut issues = Vec::new();

    match count {
        0 if !no_embed => issues.push("missing youtube shortcode".to_string()),
        0 => {}
        1 if no_embed => issues
            .push("unexpected youtube shortcode together with no-embed badge".to_string()),
        1 => {}
        _ => issues.push("multiple youtube shortcodes found".to_string()),
    }

    EmbedScan { count, issues }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_status() {
        assert_eq!(extract_main("{{< main-missing >}}").status, MainStatus::Missing);
        assert_eq!(
            extract_main("{{<main-really-missing>}}").status,
            MainStatus::ReallyMissing
        );
        assert_eq!(
            extract_main("{{<main-missing>}} {{<main-really-missing>}}").status,
            MainStatus::Problem
        );
        assert_eq!(extract_main("nothing here").status, MainStatus::Problem);
        assert_eq!(extract_main("").status, MainStatus::Problem);
    }

    #[test]
    fn test_main_present_allows_missing_badge() {
        let main = extract_main("{{< time 11 >}}\n\n{{< youtube LN0ucKNX0hc >}}");
        assert_eq!(main.status, MainStatus::Present);
        assert_eq!(main.videos.len(), 1);
        assert_eq!(main.videos.0[0].minutes, 11);
        assert!(main.issues().is_empty());
    }

    #[test]
    fn test_main_keeps_unchecked_and_ignores_audio() {
        let main = extract_main(
            "{{< time 11 >}} {{<badge-audio>}} {{<badge-unchecked>}}\n\n{{< youtube id=LN0ucKNX0hc start=56 >}}",
        );
        let video = &main.videos.0[0];
        assert_eq!(video.badges, Badges::from_iter([Badge::Unchecked]));
        assert!(video.issues.is_empty(), "{:?}", video.issues);
        assert!(main.has_any(&[Badge::Unchecked]));
    }

    #[test]
    fn test_duplicate_youtube_in_related_video() {
        let content = "### Some talk\n\n{{< time 5 >}} {{<badge-extra>}}\n\n{{< youtube a >}}\n{{< youtube b >}}\n";
        let videos = extract_videos(content, false);

        assert_eq!(videos.len(), 1);
        assert_eq!(videos.0[0].minutes, 5);
        assert_eq!(videos.0[0].issues, vec!["multiple youtube shortcodes found"]);
    }

    #[test]
    fn test_sub_headings_split_videos_and_commentary_is_dropped() {
        let content = "### Topic\n\n#### First\n\n{{< time 12 >}} {{<badge-extra>}}\n\n{{< youtube a >}}\n\n#### Second\n\n{{< time 14 >}} {{<badge-alternative>}}\n\n{{< youtube b >}}\n\n### Just words\n\nNo video here.\n";
        let videos = extract_videos(content, false);

        assert_eq!(videos.len(), 2);
        assert_eq!(videos.0[0].minutes, 12);
        assert_eq!(videos.0[1].badges, Badges::from_iter([Badge::Alternative]));
        assert!(videos.issues().is_empty(), "{:?}", videos.issues());
    }

    #[test]
    fn test_time_issues() {
        let video = extract_video("{{<badge-extra>}} {{< youtube a >}}", false).unwrap();
        assert!(video.issues.contains(&"missing time shortcode".to_string()));

        let video =
            extract_video("{{< time 3 >}} {{< time 4 >}} {{<badge-extra>}} {{< youtube a >}}", false)
                .unwrap();
        assert_eq!(video.minutes, 3);
        assert!(video.issues.contains(&"multiple time shortcodes found".to_string()));

        let video = extract_video("{{< time x1 >}} {{<badge-extra>}} {{< youtube a >}}", false)
            .unwrap();
        assert_eq!(video.minutes, 0);
        assert!(video.issues.contains(&"failed to parse duration: x1".to_string()));
    }

    #[test]
    fn test_second_level_badge_is_reported() {
        let video = extract_video(
            "{{< time 10 >}} {{<badge-extra>}} {{<badge-unchecked>}} {{<badge-hint>}} {{< youtube a >}}",
            false,
        )
        .unwrap();
        assert_eq!(video.issues, vec!["unexpected badge shortcode found: hint"]);
        assert_eq!(video.badges.len(), 3);
    }

    #[test]
    fn test_missing_and_unknown_badges() {
        let video = extract_video("{{< time 10 >}} {{< youtube a >}}", false).unwrap();
        assert_eq!(video.issues, vec!["missing badge shortcode"]);

        let video = extract_video("{{< time 10 >}} {{<badge-shiny>}} {{< youtube a >}}", false)
            .unwrap();
        assert!(video.issues.contains(&"unknown badge: 'shiny'".to_string()));
    }

    #[test]
    fn test_no_embed() {
        let video = extract_video("{{< time 10 >}} {{<badge-extra>}} {{<badge-no-embed>}}", false)
            .unwrap();
        assert!(video.issues.is_empty(), "{:?}", video.issues);

        let video = extract_video(
            "{{< time 10 >}} {{<badge-extra>}} {{<badge-no-embed>}} {{< youtube a >}}",
            false,
        )
        .unwrap();
        assert_eq!(
            video.issues,
            vec!["unexpected youtube shortcode together with no-embed badge"]
        );

        let video = extract_video("{{< time 10 >}} {{<badge-extra>}}", false).unwrap();
        assert_eq!(video.issues, vec!["missing youtube shortcode"]);
    }

    #[test]
    fn test_duration_heuristics() {
        let video = extract_video("{{< time 120 >}} {{<badge-alternative>}} {{< youtube a >}}", false)
            .unwrap();
        assert_eq!(video.issues.len(), 1);
        assert!(video.issues[0].starts_with("badges should have full-course"));

        let video = extract_video("{{< time 150 >}} {{<badge-full-course>}} {{< youtube a >}}", false)
            .unwrap();
        assert!(video.issues.is_empty());

        let video = extract_video("{{< time 61 >}} {{<badge-extra>}} {{< youtube a >}}", false)
            .unwrap();
        assert!(video.issues[0].starts_with("badges should have deep-dive"));

        let video = extract_video("{{< time 29 >}} {{<badge-deep-dive>}} {{< youtube a >}}", false)
            .unwrap();
        assert!(video.issues[0].starts_with("badges should have extra"));

        let video = extract_video("{{< time 60 >}} {{<badge-extra>}} {{< youtube a >}}", false)
            .unwrap();
        assert!(video.issues.is_empty());
    }

    #[test]
    fn test_only_first_duration_rule_fires() {
        let video = extract_video(
            "{{< time 123 >}} {{<badge-alternative>}} {{<badge-extra>}}\n\n{{< youtube foo >}}",
            false,
        )
        .unwrap();
        assert_eq!(
            video.issues,
            vec![
                "unexpected badge shortcode found: extra",
                "badges should have full-course, but do not. badges: alternative, extra",
            ]
        );
    }

    #[test]
    fn test_deep_dive_rule_needs_extra_alone() {
        let video = extract_video(
            "{{< time 90 >}} {{<badge-extra>}} {{<badge-unchecked>}} {{< youtube a >}}",
            false,
        )
        .unwrap();
        assert!(video.issues.is_empty(), "{:?}", video.issues);
    }

    #[test]
    fn test_fun_badge_allows_long_videos() {
        let video = extract_video("{{< time 119 >}} {{<badge-fun>}} {{< youtube a >}}", false)
            .unwrap();
        assert!(video.issues.is_empty(), "{:?}", video.issues);

        let video = extract_video("{{< time 119 >}} {{<badge-hint>}} {{< youtube a >}}", false)
            .unwrap();
        assert_eq!(
            video.issues,
            vec!["badges should have full-course, but do not. badges: hint"]
        );
    }

    #[test]
    fn test_badge_before_time() {
        let video = extract_video("{{<badge-extra>}} {{< time 10 >}} {{< youtube a >}}", false)
            .unwrap();
        assert_eq!(video.issues, vec!["badge should be placed after time"]);
    }
}
