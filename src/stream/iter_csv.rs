use csv::{Reader, ReaderBuilder, StringRecord};
use num::Float;
use std::collections::HashMap;
use std::io::BufReader;
use std::str::FromStr;
use std::{fs::File, path::Path};
use tracing::trace;

use crate::common::Observation;
use crate::stream::data_stream::{DataStream, Target};

/// Streams the rows of a CSV file with headers as [`DataStream`]s.
///
/// Fields that parse as `F` become features of the observation, the others are left out.
/// Columns named by `y_cols` never reach the observation and are kept verbatim as targets.
///
/// ```
/// use light_hst::stream::data_stream::Target;
/// use light_hst::stream::iter_csv::IterCsv;
///
/// let content = "Time,Amount,Class\n0.1,0.5,0\n0.2,0.7,1";
/// let rows: Vec<_> = IterCsv::<f32, &[u8]>::new(content.as_bytes(), Some(Target::Name("Class".to_string())))
///     .unwrap()
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[1].get_x()["Amount"], 0.7);
/// assert_eq!(rows[1].label("Class"), Some("1"));
/// ```
pub struct IterCsv<F: Float + FromStr, R: std::io::Read> {
    reader: Reader<R>,
    headers: StringRecord,
    y_cols: Option<Target>,
    record: StringRecord,
    _marker: std::marker::PhantomData<F>,
}

impl<F: Float + FromStr, R: std::io::Read> IterCsv<F, R> {
    pub fn new(reader: R, y_cols: Option<Target>) -> Result<Self, csv::Error> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers = reader.headers()?.to_owned();
        Ok(Self {
            reader,
            headers,
            y_cols,
            record: StringRecord::new(),
            _marker: std::marker::PhantomData,
        })
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    fn is_target(&self, header: &str) -> bool {
        self.y_cols
            .as_ref()
            .map_or(false, |cols| cols.contains(header))
    }

    fn parse_record(&self) -> DataStream<F> {
        let mut x: Observation<F> = HashMap::new();
        let mut y: HashMap<String, String> = HashMap::new();
        for (header, field) in self.headers.iter().zip(self.record.iter()) {
            if self.is_target(header) {
                y.insert(header.to_string(), field.to_string());
                continue;
            }
            match field.trim().parse::<F>() {
                Ok(value) => {
                    x.insert(header.to_string(), value);
                }
                Err(_) => trace!(header, field, "skipping non-numeric field"),
            }
        }
        match self.y_cols {
            Some(_) => DataStream::XY(x, y),
            None => DataStream::X(x),
        }
    }
}

impl<F: Float + FromStr> IterCsv<F, BufReader<File>> {
    pub fn from_path<P: AsRef<Path>>(path: P, y_cols: Option<Target>) -> Result<Self, csv::Error> {
        let file = File::open(path)?;
        IterCsv::new(BufReader::new(file), y_cols)
    }
}

impl<F: Float + FromStr, R: std::io::Read> Iterator for IterCsv<F, R> {
    type Item = Result<DataStream<F>, csv::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.record) {
            Ok(true) => Some(Ok(self.parse_record())),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
