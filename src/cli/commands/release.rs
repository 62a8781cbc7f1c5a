use super::{Command, CommandBase, RepoArgs};
use crate::github::GitHubError;
use crate::templates::NO_RELEASES;
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use octocrab::models::repos::Release;

const HEADERS: [&str; 8] = [
    "ID",
    "Name",
    "Tag",
    "Commitish",
    "Draft",
    "Prerelease",
    "Created",
    "Published",
];

/// List the releases of a repository
#[derive(Args, Debug, Clone, Default)]
pub struct ReleaseListCommand {
    #[command(flatten)]
    pub target: RepoArgs,
}

impl Command for ReleaseListCommand {
    fn name(&self) -> &'static str {
        "release:list"
    }

    async fn execute(&self, base: &CommandBase) -> Result<i32> {
        let target = base
            .repository(self.target.org.as_deref(), self.target.repo.as_deref())
            .await?;

        let first_page = base
            .github()?
            .repos(&target.owner, &target.repo)
            .releases()
            .list()
            .per_page(100)
            .send()
            .await
            .map_err(GitHubError::from)?;
        let releases = base.all_pages(first_page).await?;

        if releases.is_empty() {
            println!(
                "{}",
                base.render(NO_RELEASES, [("vendor", &target.owner), ("repository", &target.repo)])?
            );
            return Ok(CommandBase::SUCCESS);
        }

        let rows: Vec<ReleaseRow> = releases.iter().map(ReleaseRow::from).collect();
        println!("{}", format_release_table(&rows));
        Ok(CommandBase::SUCCESS)
    }
}

/// One printable release line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRow {
    pub id: u64,
    pub name: String,
    pub tag: String,
    pub commitish: String,
    pub draft: bool,
    pub prerelease: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<&Release> for ReleaseRow {
    fn from(release: &Release) -> Self {
        Self {
            id: release.id.0,
            name: release.name.clone().unwrap_or_default(),
            tag: release.tag_name.clone(),
            commitish: release.target_commitish.clone(),
            draft: release.draft,
            prerelease: release.prerelease,
            created_at: release.created_at,
            published_at: release.published_at,
        }
    }
}

impl ReleaseRow {
    fn cells(&self) -> [String; 8] {
        [
            self.id.to_string(),
            self.name.clone(),
            self.tag.clone(),
            self.commitish.clone(),
            yes_no(self.draft).to_string(),
            yes_no(self.prerelease).to_string(),
            format_date(self.created_at),
            format_date(self.published_at),
        ]
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

/// Left-aligned columns separated by two spaces, header first.
pub fn format_release_table(rows: &[ReleaseRow]) -> String {
    let cells: Vec<[String; 8]> = rows.iter().map(ReleaseRow::cells).collect();

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |values: Vec<&str>| -> String {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(value, &width)| format!("{value:<width$}"))
            .collect();
        format!(" {}", padded.join("  ")).trim_end().to_string()
    };

    let mut lines = vec![format_line(HEADERS.to_vec())];
    for row in &cells {
        lines.push(format_line(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}
