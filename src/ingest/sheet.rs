//! Spreadsheet-shaped inputs: results rows and the draft roster.
//!
//! Sheets arrive as a grid of text cells (first row is the header). Column
//! positions are located by header text; a missing required header is a
//! hard error for that sheet, while noisy cell values are tolerated.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::teams::{TeamRoster, MULTIPLIED_LABEL, WEIGHTED_LABEL};

pub const COUNTRY_HEADER: &str = "Country";
pub const GOLD_HEADER: &str = "Gold";
pub const SILVER_HEADER: &str = "Silver";
pub const BRONZE_HEADER: &str = "Bronze";
pub const MULTIPLIER_HEADER: &str = "Multiplier";

/// Structural problems that make a sheet unusable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    #[error("Sheet '{sheet}' is empty")]
    Empty { sheet: String },

    #[error("Sheet '{sheet}' is missing required column '{column}'")]
    MissingColumn { sheet: String, column: String },

    #[error("Sheet '{sheet}' has no team names in its header row")]
    NoTeams { sheet: String },
}

/// A cell as it may appear in exported sheet JSON
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Empty,
}

impl From<CellValue> for String {
    fn from(cell: CellValue) -> Self {
        match cell {
            CellValue::Text(s) => s,
            CellValue::Integer(n) => n.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Empty => String::new(),
        }
    }
}

/// Rows of text cells. Rows may be ragged; missing cells read as "".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Vec<CellValue>>", into = "Vec<Vec<String>>")]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl From<Vec<Vec<CellValue>>> for Grid {
    fn from(rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(String::from).collect())
                .collect(),
        }
    }
}

impl From<Grid> for Vec<Vec<String>> {
    fn from(grid: Grid) -> Self {
        grid.rows
    }
}

impl Grid {
    pub fn new<R, C>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Cell text by 0-based position, "" when out of range
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Write a cell, growing the grid as needed
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value.into();
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 0-based index of the header cell equal to `name` (trimmed, any case)
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header()?
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    }
}

/// Column positions of a results sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResultsLayout {
    pub country: usize,
    pub gold: usize,
    pub silver: usize,
    pub bronze: usize,
    pub multiplier: Option<usize>,
}

impl ResultsLayout {
    /// Locate the results columns. Country, Gold, Silver and Bronze are required.
    pub fn detect(grid: &Grid, sheet: &str) -> Result<Self, SheetError> {
        if grid.is_empty() {
            return Err(SheetError::Empty {
                sheet: sheet.to_string(),
            });
        }

        let required = |name: &str| {
            grid.column(name).ok_or_else(|| SheetError::MissingColumn {
                sheet: sheet.to_string(),
                column: name.to_string(),
            })
        };

        Ok(Self {
            country: required(COUNTRY_HEADER)?,
            gold: required(GOLD_HEADER)?,
            silver: required(SILVER_HEADER)?,
            bronze: required(BRONZE_HEADER)?,
            multiplier: grid.column(MULTIPLIER_HEADER),
        })
    }

    /// Width a row needs to hold every known column
    pub fn width(&self) -> usize {
        [self.country, self.gold, self.silver, self.bronze]
            .into_iter()
            .chain(self.multiplier)
            .max()
            .unwrap_or(0)
            + 1
    }
}

/// One results-sheet row, values still as typed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsRow {
    /// 1-based sheet row number
    pub row: usize,
    pub country: String,
    pub gold: String,
    pub silver: String,
    pub bronze: String,
    pub multiplier: Option<String>,
}

/// Read every results row with a non-blank country.
pub fn results_rows(grid: &Grid, sheet: &str) -> Result<(ResultsLayout, Vec<ResultsRow>), SheetError> {
    let layout = ResultsLayout::detect(grid, sheet)?;

    let rows = (1..grid.len())
        .filter_map(|r| {
            let country = grid.cell(r, layout.country).trim();
            if country.is_empty() {
                return None;
            }
            Some(ResultsRow {
                row: r + 1,
                country: country.to_string(),
                gold: grid.cell(r, layout.gold).to_string(),
                silver: grid.cell(r, layout.silver).to_string(),
                bronze: grid.cell(r, layout.bronze).to_string(),
                multiplier: layout.multiplier.map(|c| grid.cell(r, c).to_string()),
            })
        })
        .collect();

    Ok((layout, rows))
}

/// Roster read from a draft sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftSheet {
    pub roster: TeamRoster,

    /// 0-based column of each team, in header order
    pub team_columns: Vec<(usize, String)>,

    /// 1-based row of the deepest drafted country (1 if none)
    pub last_roster_row: usize,
}

/// Read the draft roster: each non-blank header cell names a team, and the
/// non-blank cells below it are that team's countries.
///
/// Cells holding previously written totals (numbers or the totals labels)
/// are not countries.
pub fn draft_roster(grid: &Grid, sheet: &str) -> Result<DraftSheet, SheetError> {
    let header = grid.header().ok_or_else(|| SheetError::Empty {
        sheet: sheet.to_string(),
    })?;

    let team_columns: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .filter(|(_, name)| !name.trim().is_empty())
        .map(|(col, name)| (col, name.trim().to_string()))
        .collect();

    if team_columns.is_empty() {
        return Err(SheetError::NoTeams {
            sheet: sheet.to_string(),
        });
    }

    let mut roster = TeamRoster::new();
    let mut last_roster_row = 1;

    for (col, team) in &team_columns {
        let mut countries = Vec::new();
        for r in 1..grid.len() {
            let cell = grid.cell(r, *col).trim();
            if !is_country_cell(cell) {
                continue;
            }
            countries.push(cell.to_string());
            last_roster_row = last_roster_row.max(r + 1);
        }
        debug!(team = %team, countries = countries.len(), "Read draft column");
        roster.add_team(team.clone(), countries);
    }

    Ok(DraftSheet {
        roster,
        team_columns,
        last_roster_row,
    })
}

fn is_country_cell(cell: &str) -> bool {
    !cell.is_empty()
        && cell.replace(',', ".").parse::<f64>().is_err()
        && cell != WEIGHTED_LABEL
        && cell != MULTIPLIED_LABEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_deserializes_mixed_cells() {
        let grid: Grid = serde_json::from_str(r#"[["Country", "Gold"], ["Norway", 3], ["Sweden", null]]"#).unwrap();
        assert_eq!(grid.cell(1, 1), "3");
        assert_eq!(grid.cell(2, 1), "");
        assert_eq!(grid.cell(9, 9), "");
    }

    #[test]
    fn test_grid_set_grows() {
        let mut grid = Grid::new(vec![vec!["a"]]);
        grid.set(2, 3, "x");
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.cell(2, 3), "x");
        assert_eq!(grid.cell(0, 0), "a");
    }

    #[test]
    fn test_results_layout_detection() {
        let grid = Grid::new(vec![vec!["Rank", "country", "Gold", "Silver", "Bronze", "Multiplier"]]);
        let layout = ResultsLayout::detect(&grid, "Results").unwrap();
        assert_eq!(layout.country, 1);
        assert_eq!(layout.multiplier, Some(5));
        assert_eq!(layout.width(), 6);
    }

    #[test]
    fn test_results_missing_column() {
        let grid = Grid::new(vec![vec!["Country", "Gold", "Silver"]]);
        let err = ResultsLayout::detect(&grid, "Results").unwrap_err();
        assert_eq!(
            err,
            SheetError::MissingColumn {
                sheet: "Results".to_string(),
                column: "Bronze".to_string()
            }
        );

        let err = ResultsLayout::detect(&Grid::default(), "Results").unwrap_err();
        assert!(matches!(err, SheetError::Empty { .. }));
    }

    #[test]
    fn test_results_rows_skip_blank_countries() {
        let grid = Grid::new(vec![
            vec!["Country", "Gold", "Silver", "Bronze"],
            vec!["Norway", "3", "1", ""],
            vec!["", "1", "1", "1"],
            vec!["Sweden"],
        ]);

        let (layout, rows) = results_rows(&grid, "Results").unwrap();
        assert!(layout.multiplier.is_none());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row, 2);
        assert_eq!(rows[1].row, 4);
        assert_eq!(rows[1].gold, "");
        assert!(rows[1].multiplier.is_none());
    }

    #[test]
    fn test_draft_roster_columns() {
        let grid = Grid::new(vec![
            vec!["Team A", "", "Team B"],
            vec!["Netherlands", "", "USA"],
            vec!["Norway", "note", ""],
            vec!["", "", "Canada"],
            vec![],
            vec!["12", "", "7"],
        ]);

        let draft = draft_roster(&grid, "Draft").unwrap();
        let teams = draft.roster.teams();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].name, "Team A");
        assert_eq!(teams[0].countries.len(), 2);
        assert_eq!(teams[1].countries[1].display(), "Canada");
        assert_eq!(draft.last_roster_row, 4);
        assert_eq!(draft.team_columns, vec![(0, "Team A".to_string()), (2, "Team B".to_string())]);
    }

    #[test]
    fn test_draft_roster_without_teams() {
        let grid = Grid::new(vec![vec!["", " "]]);
        assert!(matches!(
            draft_roster(&grid, "Draft"),
            Err(SheetError::NoTeams { .. })
        ));
        assert!(matches!(
            draft_roster(&Grid::default(), "Draft"),
            Err(SheetError::Empty { .. })
        ));
    }
}
