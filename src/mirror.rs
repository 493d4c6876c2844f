//! Refresh observers that mirror editor state into text: the JSON pose twin,
//! the shareable URL fragment and the status line.

use crate::editor::PoseEditor;
use crate::error::{Error, Result};
use crate::geom::Point;
use crate::problem::{Pose, Solution};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// `{"problem_id": .., "vertices": [..]}` for the current pose.
pub fn mirror_text(problem_id: u32, pose: &[Point]) -> Result<String> {
    let solution = Solution {
        problem_id: Some(problem_id),
        vertices: pose.to_vec(),
    };
    Ok(serde_json::to_string(&solution)?)
}

pub fn parse_mirror(text: &str) -> Result<Solution> {
    Ok(serde_json::from_str(text)?)
}

/// State carried in a shareable link, `#problem_id=3&base_solution_id=9&pose=%5B%5B0%2C1%5D..`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    pub problem_id: Option<u32>,
    pub base_solution_id: Option<u64>,
    pub pose: Option<Pose>,
}

impl Fragment {
    /// Parses a fragment, with or without its leading `#`. Values are
    /// percent-decoded the way a browser's `URLSearchParams` does. Unknown keys
    /// are ignored.
    pub fn parse(text: &str) -> Result<Fragment> {
        let text = text.strip_prefix('#').unwrap_or(text);
        let mut fragment = Fragment::default();
        for (key, value) in form_urlencoded::parse(text.as_bytes()) {
            match key.as_ref() {
                "problem_id" => {
                    let id = value
                        .parse()
                        .map_err(|_| Error::Fragment(format!("bad problem_id {:?}", value)))?;
                    fragment.problem_id = Some(id);
                }
                "base_solution_id" => {
                    let id = value
                        .parse()
                        .map_err(|_| Error::Fragment(format!("bad base_solution_id {:?}", value)))?;
                    fragment.base_solution_id = Some(id);
                }
                "pose" => fragment.pose = Some(serde_json::from_str(&value)?),
                _ => log::debug!("ignoring fragment key {:?}", key),
            }
        }
        Ok(fragment)
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(id) = self.problem_id {
            query.append_pair("problem_id", &id.to_string());
        }
        if let Some(id) = self.base_solution_id {
            query.append_pair("base_solution_id", &id.to_string());
        }
        if let Some(pose) = &self.pose {
            let json = serde_json::to_string(pose).map_err(|_| fmt::Error)?;
            query.append_pair("pose", &json);
        }
        write!(f, "#{}", query.finish())
    }
}

pub fn status_text(editor: &PoseEditor) -> String {
    let globalist = editor.compute_globalist();
    format!(
        "dislike: {}  globalist: {:.4}/{:.4}",
        editor.compute_dislike(),
        globalist.current,
        globalist.limit
    )
}

/// Observer that keeps `out` equal to the JSON twin of the pose.
pub fn text_mirror(problem_id: Rc<Cell<u32>>, out: Rc<RefCell<String>>) -> impl FnMut(&PoseEditor) {
    move |editor| match mirror_text(problem_id.get(), editor.pose()) {
        Ok(text) => *out.borrow_mut() = text,
        Err(e) => log::warn!("could not mirror pose: {}", e),
    }
}

/// Observer that keeps `out` equal to a shareable fragment for the pose.
pub fn fragment_persister(problem_id: Rc<Cell<u32>>, out: Rc<RefCell<String>>) -> impl FnMut(&PoseEditor) {
    move |editor| {
        let fragment = Fragment {
            problem_id: Some(problem_id.get()),
            base_solution_id: None,
            pose: Some(editor.pose().to_vec()),
        };
        *out.borrow_mut() = fragment.to_string();
    }
}

/// Observer that keeps `out` equal to the status line.
pub fn status_label(out: Rc<RefCell<String>>) -> impl FnMut(&PoseEditor) {
    move |editor| *out.borrow_mut() = status_text(editor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Figure, Problem};

    fn square_problem() -> Problem {
        let corners = vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
        ];
        Problem {
            hole: corners.clone(),
            figure: Figure {
                edges: vec![(0, 1), (1, 2), (2, 3), (3, 0)],
                vertices: corners,
            },
            epsilon: 250000,
            bonuses: vec![],
        }
    }

    #[test]
    fn mirror_text_matches_solution_schema() {
        let text = mirror_text(4, &[Point::new(1.0, 2.0), Point::new(3.0, 4.0)]).unwrap();
        assert_eq!(text, r#"{"problem_id":4,"vertices":[[1,2],[3,4]]}"#);
        let parsed = parse_mirror(&text).unwrap();
        assert_eq!(parsed.problem_id, Some(4));
        assert_eq!(parsed.vertices[1], Point::new(3.0, 4.0));
        assert!(parse_mirror("{\"vertices\": 3}").is_err());
    }

    #[test]
    fn fragment_round_trip() {
        let fragment = Fragment {
            problem_id: Some(12),
            base_solution_id: Some(99),
            pose: Some(vec![Point::new(0.0, 1.0), Point::new(2.0, 3.0)]),
        };
        let text = fragment.to_string();
        assert_eq!(
            text,
            "#problem_id=12&base_solution_id=99&pose=%5B%5B0%2C1%5D%2C%5B2%2C3%5D%5D"
        );
        assert_eq!(Fragment::parse(&text).unwrap(), fragment);
    }

    #[test]
    fn fragment_from_a_browser_link_is_decoded() {
        let fragment = Fragment::parse("#problem_id=12&pose=%5B%5B0%2C1%5D%2C%5B2%2C3%5D%5D").unwrap();
        assert_eq!(fragment.problem_id, Some(12));
        assert_eq!(fragment.pose, Some(vec![Point::new(0.0, 1.0), Point::new(2.0, 3.0)]));
        assert_eq!(
            fragment.to_string(),
            "#problem_id=12&pose=%5B%5B0%2C1%5D%2C%5B2%2C3%5D%5D"
        );
        // Hand-typed links without encoding still parse.
        let raw = Fragment::parse("problem_id=12&pose=[[0,1],[2,3]]").unwrap();
        assert_eq!(raw, fragment);
    }

    #[test]
    fn fragment_parsing_is_lenient_about_extras() {
        let fragment = Fragment::parse("problem_id=5&zoom=3&").unwrap();
        assert_eq!(fragment.problem_id, Some(5));
        assert_eq!(fragment.pose, None);
        assert_eq!(Fragment::parse("").unwrap(), Fragment::default());
        match Fragment::parse("#problem_id=five") {
            Err(Error::Fragment(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn observers_follow_the_editor() {
        let mut editor = PoseEditor::default();
        let problem_id = Rc::new(Cell::new(7));
        let mirror = Rc::new(RefCell::new(String::new()));
        let link = Rc::new(RefCell::new(String::new()));
        let status = Rc::new(RefCell::new(String::new()));
        editor.on_refresh(text_mirror(problem_id.clone(), mirror.clone()));
        editor.on_refresh(fragment_persister(problem_id.clone(), link.clone()));
        editor.on_refresh(status_label(status.clone()));
        editor.set_problem(square_problem());

        assert_eq!(
            *mirror.borrow(),
            r#"{"problem_id":7,"vertices":[[0,0],[0,10],[10,10],[10,0]]}"#
        );
        assert_eq!(
            *link.borrow(),
            "#problem_id=7&pose=%5B%5B0%2C0%5D%2C%5B0%2C10%5D%2C%5B10%2C10%5D%2C%5B10%2C0%5D%5D"
        );
        assert_eq!(*status.borrow(), "dislike: 0  globalist: 0.0000/1.0000");

        let mut moved = editor.pose().to_vec();
        moved[0] = Point::new(1.0, 0.0);
        editor.set_pose(moved).unwrap();
        assert!(mirror.borrow().starts_with(r#"{"problem_id":7,"vertices":[[1,0],"#));
        assert!(status.borrow().starts_with("dislike: 1  "));
    }
}
