//! Keyboard adjacency graphs for spatial matching.
//!
//! A layout is a text grid, one key row per line. Each whitespace-separated token is one
//! key holding its unshifted and (optionally) shifted character. Slanted layouts shift
//! every row one column right of the previous one; aligned layouts (keypads) do not.

use std::collections::{HashMap, HashSet};
use thiserror::Error;

pub const QWERTY: &str = "qwerty";
pub const DVORAK: &str = "dvorak";
pub const KEYPAD: &str = "keypad";
pub const MAC_KEYPAD: &str = "mac_keypad";

const BUILTIN_LAYOUTS: [(&str, &str, bool); 4] = [
    (QWERTY, include_str!("../assets/qwerty.txt"), true),
    (DVORAK, include_str!("../assets/dvorak.txt"), true),
    (KEYPAD, include_str!("../assets/keypad.txt"), false),
    (MAC_KEYPAD, include_str!("../assets/mac_keypad.txt"), false),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Layout '{0}' has no keys")]
    Empty(String),
    #[error("Layout line {line}: token '{token}' does not match the layout's key size")]
    InconsistentTokenSize { line: usize, token: String },
}

/// Read-only adjacency structure of one keyboard layout.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialGraph {
    name: String,
    /// Neighbor slots per character, clockwise starting from the left key.
    /// Slot order encodes direction; `None` marks a missing key.
    adjacency: HashMap<char, Vec<Option<String>>>,
    shifted: HashSet<char>,
    starting_positions: usize,
    average_degree: f64,
}

fn slanted_neighbors(x: i64, y: i64) -> [(i64, i64); 6] {
    [
        (x - 1, y),
        (x, y - 1),
        (x + 1, y - 1),
        (x + 1, y),
        (x, y + 1),
        (x - 1, y + 1),
    ]
}

fn aligned_neighbors(x: i64, y: i64) -> [(i64, i64); 8] {
    [
        (x - 1, y),
        (x - 1, y - 1),
        (x, y - 1),
        (x + 1, y - 1),
        (x + 1, y),
        (x + 1, y + 1),
        (x, y + 1),
        (x - 1, y + 1),
    ]
}

/// Whitespace-separated tokens with their starting character column.
fn tokens_with_columns(line: &str) -> Vec<(usize, String)> {
    let mut tokens = Vec::new();
    let mut current: Option<(usize, String)> = None;
    for (column, c) in line.chars().enumerate() {
        if c.is_whitespace() {
            if let Some(token) = current.take() {
                tokens.push(token);
            }
        } else {
            current
                .get_or_insert_with(|| (column, String::new()))
                .1
                .push(c);
        }
    }
    tokens.extend(current);
    tokens
}

impl SpatialGraph {
    /// Builds the graph for a layout grid.
    ///
    /// # Errors
    ///
    /// Returns error if the grid has no keys or its keys differ in size.
    pub fn from_layout(
        name: impl Into<String>,
        layout: &str,
        slanted: bool,
    ) -> Result<Self, LayoutError> {
        let name = name.into();
        let rows: Vec<Vec<(usize, String)>> = layout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(tokens_with_columns)
            .collect();

        let token_size = rows
            .iter()
            .flatten()
            .map(|(_, token)| token.chars().count())
            .next()
            .ok_or_else(|| LayoutError::Empty(name.clone()))?;

        let mut positions: HashMap<(i64, i64), String> = HashMap::new();
        for (y, row) in rows.iter().enumerate() {
            let slant = if slanted { y } else { 0 };
            for (column, token) in row {
                if token.chars().count() != token_size {
                    return Err(LayoutError::InconsistentTokenSize {
                        line: y + 1,
                        token: token.clone(),
                    });
                }
                let x = (column.saturating_sub(slant) / (token_size + 1)) as i64;
                positions.insert((x, y as i64), token.clone());
            }
        }

        let mut adjacency = HashMap::new();
        let mut shifted = HashSet::new();
        for (&(x, y), token) in &positions {
            let coords: Vec<(i64, i64)> = if slanted {
                slanted_neighbors(x, y).to_vec()
            } else {
                aligned_neighbors(x, y).to_vec()
            };
            let slots: Vec<Option<String>> = coords
                .iter()
                .map(|coord| positions.get(coord).cloned())
                .collect();
            for (index, c) in token.chars().enumerate() {
                if index > 0 {
                    shifted.insert(c);
                }
                adjacency.insert(c, slots.clone());
            }
        }

        let starting_positions = adjacency.len();
        let degree_sum: usize = adjacency
            .values()
            .map(|slots| slots.iter().filter(|s| s.is_some()).count())
            .sum();
        let average_degree = degree_sum as f64 / starting_positions as f64;

        Ok(Self {
            name,
            adjacency,
            shifted,
            starting_positions,
            average_degree,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of distinct characters on the layout.
    pub fn starting_positions(&self) -> usize {
        self.starting_positions
    }

    /// Mean number of present neighbors per character.
    pub fn average_degree(&self) -> f64 {
        self.average_degree
    }

    pub fn neighbors(&self, c: char) -> Option<&[Option<String>]> {
        self.adjacency.get(&c).map(Vec::as_slice)
    }

    /// True when `c` is typed with shift on this layout.
    pub fn is_shifted(&self, c: char) -> bool {
        self.shifted.contains(&c)
    }

    /// Direction (slot index) from `c` to `adjacent`, and whether `adjacent` is the
    /// shifted character of that key. `None` when the keys are not neighbors.
    pub fn adjacent_direction(&self, c: char, adjacent: char) -> Option<(usize, bool)> {
        let slots = self.adjacency.get(&c)?;
        slots.iter().enumerate().find_map(|(direction, slot)| {
            let key = slot.as_deref()?;
            let position = key.chars().position(|k| k == adjacent)?;
            Some((direction, position > 0))
        })
    }
}

/// The compiled-in layouts: qwerty and dvorak (slanted), keypad and mac keypad (aligned).
pub fn builtin_graphs() -> Vec<SpatialGraph> {
    BUILTIN_LAYOUTS
        .iter()
        .map(|(name, layout, slanted)| {
            SpatialGraph::from_layout(*name, layout, *slanted)
                .expect("built-in keyboard layout is well-formed")
        })
        .collect()
}
