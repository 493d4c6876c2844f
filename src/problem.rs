use crate::error::{Error, Result};
use crate::geom::{distance2, Point};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub type Hole = Vec<Point>;

/// Current vertex positions, index aligned with `Figure::vertices`.
pub type Pose = Vec<Point>;

pub type Edge = (usize, usize);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Figure {
    pub edges: Vec<Edge>,
    pub vertices: Vec<Point>,
}

impl Figure {
    /// Squared length of `edge` in the undeformed figure.
    pub fn original_length2(&self, edge: Edge) -> f64 {
        distance2(self.vertices[edge.0], self.vertices[edge.1])
    }

    /// Edges whose endpoints both exist. A figure that is still loading may
    /// carry dangling edges; nothing downstream indexes through those.
    pub fn valid_edges(&self) -> impl Iterator<Item = (usize, Edge)> + '_ {
        let n = self.vertices.len();
        self.edges
            .iter()
            .copied()
            .enumerate()
            .filter(move |(_, (a, b))| *a < n && *b < n)
    }

    /// Vertices sharing an edge with `vertex`, once per edge.
    pub fn adjacent(&self, vertex: usize) -> Vec<usize> {
        let mut adjacents = vec![];
        for (_, (a, b)) in self.valid_edges() {
            if a == vertex {
                adjacents.push(b);
            }
            if b == vertex {
                adjacents.push(a);
            }
        }
        adjacents
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum BonusKind {
    Globalist,
    BreakALeg,
    Wallhack,
    Superflex,
    Other(String),
}

impl From<String> for BonusKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "GLOBALIST" => BonusKind::Globalist,
            "BREAK_A_LEG" => BonusKind::BreakALeg,
            "WALLHACK" => BonusKind::Wallhack,
            "SUPERFLEX" => BonusKind::Superflex,
            _ => BonusKind::Other(s),
        }
    }
}

impl From<BonusKind> for String {
    fn from(kind: BonusKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for BonusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BonusKind::Globalist => f.write_str("GLOBALIST"),
            BonusKind::BreakALeg => f.write_str("BREAK_A_LEG"),
            BonusKind::Wallhack => f.write_str("WALLHACK"),
            BonusKind::Superflex => f.write_str("SUPERFLEX"),
            BonusKind::Other(s) => f.write_str(s),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Bonus {
    pub bonus: BonusKind,
    pub position: Point,
    pub problem: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Problem {
    pub hole: Hole,
    pub figure: Figure,
    pub epsilon: i64,
    #[serde(default)]
    pub bonuses: Vec<Bonus>,
}

impl Problem {
    pub fn validate(&self) -> Result<()> {
        let vertices = self.figure.vertices.len();
        for &edge in &self.figure.edges {
            if edge.0 >= vertices || edge.1 >= vertices {
                return Err(Error::InvalidEdge { edge, vertices });
            }
        }
        Ok(())
    }
}

/// The textual twin of the canvas: `{"problem_id": .., "vertices": [[x, y], ..]}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Solution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_id: Option<u32>,
    pub vertices: Pose,
}

pub fn read_problem_from_file<P: AsRef<Path>>(path: P) -> Result<Problem> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let problem: Problem = serde_json::from_reader(reader)?;
    problem.validate()?;
    Ok(problem)
}

pub fn read_solution_from_file<P: AsRef<Path>>(path: P) -> Result<Solution> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

pub fn write_solution_to_file<P: AsRef<Path>>(path: P, solution: &Solution) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer(&file, solution)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = r#"{
        "hole": [[0, 0], [0, 10], [10, 10], [10, 0]],
        "figure": {"edges": [[0, 1], [1, 2], [2, 0]], "vertices": [[0, 0], [10, 0], [5, 5]]},
        "epsilon": 150000,
        "bonuses": [{"bonus": "GLOBALIST", "problem": 7, "position": [3, 4]},
                    {"bonus": "MYSTERY", "problem": 2, "position": [1, 1]}]
    }"#;

    #[test]
    fn parses_contest_problem_format() {
        let problem: Problem = serde_json::from_str(TRIANGLE).unwrap();
        assert_eq!(problem.hole.len(), 4);
        assert_eq!(problem.figure.edges, vec![(0, 1), (1, 2), (2, 0)]);
        assert_eq!(problem.figure.vertices[2], Point::new(5.0, 5.0));
        assert_eq!(problem.epsilon, 150000);
        assert_eq!(problem.bonuses[0].bonus, BonusKind::Globalist);
        assert_eq!(problem.bonuses[0].position, Point::new(3.0, 4.0));
        assert_eq!(problem.bonuses[1].bonus, BonusKind::Other("MYSTERY".to_owned()));
        assert!(problem.validate().is_ok());
    }

    #[test]
    fn bonuses_are_optional() {
        let problem: Problem = serde_json::from_str(
            r#"{"hole": [], "figure": {"edges": [], "vertices": []}, "epsilon": 0}"#,
        )
        .unwrap();
        assert!(problem.bonuses.is_empty());
    }

    #[test]
    fn dangling_edges_fail_validation() {
        let mut problem: Problem = serde_json::from_str(TRIANGLE).unwrap();
        problem.figure.edges.push((1, 3));
        match problem.validate() {
            Err(Error::InvalidEdge { edge, vertices }) => {
                assert_eq!(edge, (1, 3));
                assert_eq!(vertices, 3);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(problem.figure.valid_edges().count(), 3);
    }

    #[test]
    fn adjacency_follows_edges() {
        let problem: Problem = serde_json::from_str(TRIANGLE).unwrap();
        let mut adj = problem.figure.adjacent(0);
        adj.sort_unstable();
        assert_eq!(adj, vec![1, 2]);
        assert_eq!(problem.figure.original_length2((0, 1)), 100.0);
    }

    #[test]
    fn solution_round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1.solution.json");
        let solution = Solution {
            problem_id: Some(1),
            vertices: vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)],
        };
        write_solution_to_file(&path, &solution).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            r#"{"problem_id":1,"vertices":[[1,2],[3,4]]}"#
        );
        assert_eq!(read_solution_from_file(&path).unwrap(), solution);
    }

    #[test]
    fn missing_problem_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        match read_problem_from_file(dir.path().join("nope.problem")) {
            Err(Error::Io(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
