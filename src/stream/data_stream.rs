use std::collections::{HashMap, HashSet};

use crate::common::Observation;

/// This enum allows you to choose whether to define a single target (Name) or multiple targets (MultipleNames).
/// # Exemple
/// ```
/// use light_hst::stream::data_stream::Target;
/// use light_hst::stream::iter_csv::IterCsv;
/// use maplit::hashset;
///
/// let content = "Time,Amount,Class\n0.1,0.5,0\n0.2,0.7,1";
/// // Single target
/// IterCsv::<f32, &[u8]>::new(content.as_bytes(), Some(Target::Name("Class".to_string()))).unwrap();
/// // Multiple targets
/// IterCsv::<f32, &[u8]>::new(
///     content.as_bytes(),
///     Some(Target::MultipleNames(hashset! {"Time".to_string(), "Class".to_string()})),
/// )
/// .unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Name(String),
    MultipleNames(HashSet<String>),
}

impl Target {
    pub fn contains(&self, name: &str) -> bool {
        match self {
            Target::Name(n) => n == name,
            Target::MultipleNames(names) => names.contains(name),
        }
    }
}

/// One row of a stream: the observation (X), and its raw target columns when the stream
/// has some (XY).
#[derive(Debug, Clone, PartialEq)]
pub enum DataStream<F> {
    X(Observation<F>),
    XY(Observation<F>, HashMap<String, String>),
}

impl<F> DataStream<F> {
    pub fn get_x(&self) -> &Observation<F> {
        match self {
            DataStream::X(x) => x,
            DataStream::XY(x, _) => x,
        }
    }

    pub fn get_y(&self) -> Option<&HashMap<String, String>> {
        match self {
            DataStream::X(_) => None,
            DataStream::XY(_, y) => Some(y),
        }
    }

    /// Value of the target column `name`, if the row carries it.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.get_y()?.get(name).map(String::as_str)
    }
}
