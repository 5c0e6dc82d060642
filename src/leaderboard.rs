//! Leaderboard rows — contributor ranking, avatar, and per-difficulty counts.
//!
//! DESIGN
//! ======
//! A row is a pure function of (participant, rank index). Only the top three
//! indices get distinct styling; everything from index 3 down shares one
//! look. Each difficulty count links to a GitHub issue search for that
//! contributor; opening it goes through `Navigator`, never through a network
//! call from this module.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

pub const GITHUB_URL: &str = "https://github.com";
pub const ISSUE_SEARCH_URL: &str = "https://github.com/alienx5499/SortVision/issues";
/// `"SSOC S4"`, already query-encoded.
const CAMPAIGN_LABEL: &str = "%22SSOC+S4%22";
const RANK_4_PLUS: &str = "rank-4-plus";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    #[error("participants file malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
    #[error("failed to open {url}: {source}")]
    Open { url: String, source: std::io::Error },
}

// =============================================================================
// PARTICIPANT
// =============================================================================

/// One contributor's standing, as computed by the leaderboard backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub github_id: String,
    pub contributor_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub beginner_issues: u32,
    #[serde(default)]
    pub intermediate_issues: u32,
    #[serde(default)]
    pub advanced_issues: u32,
    #[serde(default)]
    pub total_points: u32,
}

impl Participant {
    #[must_use]
    pub fn issues(&self, difficulty: Difficulty) -> u32 {
        match difficulty {
            Difficulty::Beginner => self.beginner_issues,
            Difficulty::Intermediate => self.intermediate_issues,
            Difficulty::Advanced => self.advanced_issues,
        }
    }
}

/// Parse a JSON array of participants, keeping the supplied order.
///
/// # Errors
///
/// Returns [`LeaderboardError::Malformed`] when the JSON does not match.
pub fn parse_participants(json: &str) -> Result<Vec<Participant>, LeaderboardError> {
    Ok(serde_json::from_str(json)?)
}

// =============================================================================
// DIFFICULTY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Beginner, Self::Intermediate, Self::Advanced];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    /// Label used in the issue search. The repository tags advanced issues
    /// `Advance`, so that one differs from the display name.
    #[must_use]
    pub fn search_label(self) -> &'static str {
        match self {
            Self::Advanced => "Advance",
            other => other.name(),
        }
    }

    fn cell_class(self) -> &'static str {
        match self {
            Self::Beginner => "beginner-issues",
            Self::Intermediate => "intermediate-issues",
            Self::Advanced => "advanced-issues",
        }
    }

    fn hover_class(self) -> &'static str {
        match self {
            Self::Beginner => "hover:bg-green-500/10",
            Self::Intermediate => "hover:bg-yellow-500/10",
            Self::Advanced => "hover:bg-red-500/10",
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = LeaderboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" | "advance" => Ok(Self::Advanced),
            _ => Err(LeaderboardError::UnknownDifficulty(s.to_string())),
        }
    }
}

// =============================================================================
// RANK TIER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankTier {
    Gold,
    Silver,
    Bronze,
    Standard,
}

impl RankTier {
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::Gold,
            1 => Self::Silver,
            2 => Self::Bronze,
            _ => Self::Standard,
        }
    }

    /// Row background accent. Empty below the podium.
    #[must_use]
    pub fn row_class(self) -> &'static str {
        match self {
            Self::Gold => "bg-gradient-to-r from-yellow-500/10 via-transparent to-transparent",
            Self::Silver => "bg-gradient-to-r from-slate-400/10 via-transparent to-transparent",
            Self::Bronze => "bg-gradient-to-r from-amber-700/10 via-transparent to-transparent",
            Self::Standard => "",
        }
    }

    #[must_use]
    pub fn rank_class(self) -> &'static str {
        match self {
            Self::Gold => "text-yellow-400 animate-text-shimmer bg-gradient-to-r from-yellow-600 via-yellow-300 to-yellow-600 bg-clip-text",
            Self::Silver => "text-slate-300 animate-text-shimmer bg-gradient-to-r from-slate-500 via-slate-200 to-slate-500 bg-clip-text",
            Self::Bronze => "text-amber-600 animate-text-shimmer bg-gradient-to-r from-amber-700 via-amber-500 to-amber-700 bg-clip-text",
            Self::Standard => "text-indigo-300 hover:text-indigo-200",
        }
    }
}

// =============================================================================
// URLS
// =============================================================================

/// Closed campaign issues assigned to `github_id` at the given difficulty.
#[must_use]
pub fn issue_search_url(github_id: &str, difficulty: Difficulty) -> String {
    format!(
        "{ISSUE_SEARCH_URL}?q=is%3Aissue+is%3Aclosed+assignee%3A{github_id}+label%3A{}+label%3A{CAMPAIGN_LABEL}",
        difficulty.search_label()
    )
}

#[must_use]
pub fn profile_url(github_id: &str) -> String {
    format!("{GITHUB_URL}/{github_id}")
}

// =============================================================================
// NAVIGATION
// =============================================================================

/// Opens a URL in a new browsing context.
pub trait Navigator {
    /// # Errors
    ///
    /// Returns an error when the URL could not be handed off.
    fn open(&self, url: &str) -> Result<(), LeaderboardError>;
}

/// Hands URLs to the platform's default browser.
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn open(&self, url: &str) -> Result<(), LeaderboardError> {
        open::that(url).map_err(|source| LeaderboardError::Open { url: url.to_string(), source })
    }
}

// =============================================================================
// ROW
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueCell {
    pub difficulty: Difficulty,
    pub count: u32,
    pub url: String,
}

/// Rendered view of one participant at one rank.
#[derive(Debug, Clone, Copy)]
pub struct LeaderboardRow<'a> {
    participant: &'a Participant,
    index: usize,
}

impl<'a> LeaderboardRow<'a> {
    #[must_use]
    pub fn new(participant: &'a Participant, index: usize) -> Self {
        Self { participant, index }
    }

    #[must_use]
    pub fn participant(&self) -> &'a Participant {
        self.participant
    }

    #[must_use]
    pub fn tier(&self) -> RankTier {
        RankTier::from_index(self.index)
    }

    /// One-based rank, e.g. `#1`.
    #[must_use]
    pub fn rank_label(&self) -> String {
        format!("#{}", self.index + 1)
    }

    #[must_use]
    pub fn shows_crown(&self) -> bool {
        self.index == 0
    }

    /// Classes for rank, name and points text.
    #[must_use]
    pub fn rank_classes(&self) -> String {
        let tier = self.tier();
        if tier == RankTier::Standard {
            format!("{} {RANK_4_PLUS}", tier.rank_class())
        } else {
            tier.rank_class().to_string()
        }
    }

    #[must_use]
    pub fn profile_url(&self) -> String {
        profile_url(&self.participant.github_id)
    }

    #[must_use]
    pub fn issue_url(&self, difficulty: Difficulty) -> String {
        issue_search_url(&self.participant.github_id, difficulty)
    }

    #[must_use]
    pub fn cells(&self) -> [IssueCell; 3] {
        Difficulty::ALL.map(|difficulty| IssueCell {
            difficulty,
            count: self.participant.issues(difficulty),
            url: self.issue_url(difficulty),
        })
    }

    /// Activate one difficulty cell.
    ///
    /// # Errors
    ///
    /// Propagates the navigator's failure.
    pub fn click(&self, difficulty: Difficulty, navigator: &dyn Navigator) -> Result<(), LeaderboardError> {
        let url = self.issue_url(difficulty);
        tracing::debug!(github_id = %self.participant.github_id, difficulty = difficulty.name(), "leaderboard: opening issue search");
        navigator.open(&url)
    }

    /// Render as an HTML table row.
    #[must_use]
    pub fn render_html(&self) -> String {
        let p = self.participant;
        let tier = self.tier();
        let rank_classes = self.rank_classes();
        let profile = html_escape::encode_double_quoted_attribute(&self.profile_url()).into_owned();
        let name = html_escape::encode_text(&p.contributor_name).into_owned();
        let handle = html_escape::encode_text(&p.github_id).into_owned();

        let mut html = String::from("<tr class=\"border-t border-white/5");
        if !tier.row_class().is_empty() {
            let _ = write!(html, " {}", tier.row_class());
        }
        html.push_str("\">");

        html.push_str("<td class=\"px-6 py-4 w-24\">");
        if self.shows_crown() {
            html.push_str("<span class=\"crown\" aria-hidden=\"true\">\u{1F451}</span>");
        }
        let _ = write!(html, "<span class=\"{rank_classes}\">{}</span></td>", self.rank_label());

        let _ = write!(html, "<td class=\"px-6 py-4\"><a href=\"{profile}\" target=\"_blank\" rel=\"noopener noreferrer\">");
        match p.avatar_url.as_deref() {
            Some(avatar) => {
                let src = html_escape::encode_double_quoted_attribute(avatar);
                let alt = html_escape::encode_double_quoted_attribute(&p.contributor_name);
                let _ = write!(html, "<img class=\"w-10 h-10 rounded-full\" src=\"{src}\" alt=\"{alt}\">");
            }
            None => html.push_str("<div class=\"w-10 h-10 rounded-full bg-gray-700 avatar-placeholder\"></div>"),
        }
        let _ = write!(
            html,
            "</a><a href=\"{profile}\" target=\"_blank\" rel=\"noopener noreferrer\"><div class=\"font-semibold {rank_classes}\">{name}</div><div class=\"text-sm text-gray-400\">@{handle}</div></a></td>"
        );

        for cell in self.cells() {
            let href = html_escape::encode_double_quoted_attribute(&cell.url);
            let _ = write!(
                html,
                "<td class=\"px-2 py-4 text-center\"><a role=\"button\" class=\"{}\" href=\"{href}\" target=\"_blank\" rel=\"noopener noreferrer\"><span class=\"{}\">{}</span></a></td>",
                cell.difficulty.hover_class(),
                cell.difficulty.cell_class(),
                cell.count
            );
        }

        let _ = write!(html, "<td class=\"px-6 py-4 text-right font-semibold {rank_classes}\">{}</td></tr>", p.total_points);
        html
    }
}

/// Build rows for participants in their supplied order.
#[must_use]
pub fn rows(participants: &[Participant]) -> Vec<LeaderboardRow<'_>> {
    participants
        .iter()
        .enumerate()
        .map(|(index, p)| LeaderboardRow::new(p, index))
        .collect()
}

/// Plain-text table for terminals.
#[must_use]
pub fn render_text(rows: &[LeaderboardRow<'_>]) -> String {
    let mut out = format!(
        "{:<6} {:<24} {:<20} {:>8} {:>12} {:>8} {:>7}\n",
        "RANK", "NAME", "GITHUB", "BEGINNER", "INTERMEDIATE", "ADVANCED", "POINTS"
    );
    for row in rows {
        let p = row.participant();
        let rank = if row.shows_crown() { format!("{}*", row.rank_label()) } else { row.rank_label() };
        let _ = writeln!(
            out,
            "{rank:<6} {:<24} {:<20} {:>8} {:>12} {:>8} {:>7}",
            p.contributor_name, p.github_id, p.beginner_issues, p.intermediate_issues, p.advanced_issues, p.total_points
        );
    }
    out
}

#[cfg(test)]
#[path = "leaderboard_test.rs"]
mod tests;
