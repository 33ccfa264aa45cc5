use serde::Deserialize;
use serde_json::{Map, Value};

use super::data::{
    Category, PlotLabels, TermRelevanceRow, TermTopicMembership, Topic, TopicModelData,
};
use super::error::PayloadError;

const ROOT_FIELD: &str = "<payload>";

#[derive(Clone, Debug, Deserialize)]
struct RawPlotOptions {
    xlab: String,
    ylab: String,
}

/// A columnar table as emitted by the preparation step: an object of equally long arrays.
struct ColumnTable<'a> {
    name: &'static str,
    columns: &'a Map<String, Value>,
    rows: Option<usize>,
}

impl<'a> ColumnTable<'a> {
    fn from_payload(
        payload: &'a Map<String, Value>,
        name: &'static str,
    ) -> Result<Self, PayloadError> {
        let columns = payload
            .get(name)
            .ok_or_else(|| PayloadError::malformed(name, "missing table"))?
            .as_object()
            .ok_or_else(|| PayloadError::malformed(name, "expected an object of columns"))?;

        Ok(Self {
            name,
            columns,
            rows: None,
        })
    }

    fn field(&self, column: &str) -> String {
        format!("{}.{column}", self.name)
    }

    fn cells(&mut self, column: &str) -> Result<Option<&'a Vec<Value>>, PayloadError> {
        let columns = self.columns;
        let Some(value) = columns.get(column) else {
            return Ok(None);
        };
        let cells = value
            .as_array()
            .ok_or_else(|| PayloadError::malformed(self.field(column), "expected an array"))?;

        match self.rows {
            Some(rows) if rows != cells.len() => {
                return Err(PayloadError::malformed(
                    self.field(column),
                    format!("has {} rows, expected {rows}", cells.len()),
                ));
            }
            Some(_) => {}
            None => self.rows = Some(cells.len()),
        }

        Ok(Some(cells))
    }

    fn required_cells(&mut self, column: &str) -> Result<&'a Vec<Value>, PayloadError> {
        self.cells(column)?
            .ok_or_else(|| PayloadError::malformed(self.field(column), "missing column"))
    }

    fn numbers(&mut self, column: &str) -> Result<Vec<f64>, PayloadError> {
        let cells = self.required_cells(column)?;
        self.convert_numbers(column, cells)
    }

    fn optional_numbers(&mut self, column: &str) -> Result<Option<Vec<f64>>, PayloadError> {
        match self.cells(column)? {
            Some(cells) => self.convert_numbers(column, cells).map(Some),
            None => Ok(None),
        }
    }

    fn convert_numbers(&self, column: &str, cells: &[Value]) -> Result<Vec<f64>, PayloadError> {
        cells
            .iter()
            .enumerate()
            .map(|(row, cell)| match cell {
                Value::Number(number) => number.as_f64().ok_or_else(|| {
                    PayloadError::malformed(
                        self.field(column),
                        format!("row {row} is not a finite number"),
                    )
                }),
                // Encoders disagree on NaN; null is the portable spelling.
                Value::Null => Ok(f64::NAN),
                other => Err(PayloadError::malformed(
                    self.field(column),
                    format!("row {row} is not numeric: {other}"),
                )),
            })
            .collect()
    }

    fn strings(&mut self, column: &str) -> Result<Vec<String>, PayloadError> {
        let cells = self.required_cells(column)?;
        cells
            .iter()
            .enumerate()
            .map(|(row, cell)| match cell {
                Value::String(text) => Ok(text.clone()),
                Value::Number(number) => Ok(number.to_string()),
                other => Err(PayloadError::malformed(
                    self.field(column),
                    format!("row {row} is not a string: {other}"),
                )),
            })
            .collect()
    }
}

fn topic_id(field: &str, row: usize, value: f64) -> Result<usize, PayloadError> {
    if value.is_finite() && value >= 1.0 {
        Ok(value.round() as usize)
    } else {
        Err(PayloadError::malformed(
            field,
            format!("row {row} is not a topic id: {value}"),
        ))
    }
}

fn parse_topics(payload: &Map<String, Value>) -> Result<Vec<Topic>, PayloadError> {
    let mut table = ColumnTable::from_payload(payload, "mdsDat")?;
    let xs = table.numbers("x")?;
    let ys = table.numbers("y")?;
    let freqs = table.numbers("Freq")?;
    let labels = table.optional_numbers("topics")?;
    let clusters = table.optional_numbers("cluster")?;

    Ok(xs
        .into_iter()
        .zip(ys)
        .zip(freqs)
        .enumerate()
        .map(|(index, ((x, y), freq))| {
            let id = index + 1;
            let label = labels
                .as_ref()
                .and_then(|labels| labels.get(index))
                .filter(|value| value.is_finite())
                .map(|value| format!("{}", value.round() as i64))
                .unwrap_or_else(|| id.to_string());
            let cluster = clusters
                .as_ref()
                .and_then(|clusters| clusters.get(index))
                .filter(|value| value.is_finite())
                .map(|value| value.round() as i64)
                .unwrap_or(1);

            Topic {
                id,
                label,
                x,
                y,
                freq,
                cluster,
            }
        })
        .collect())
}

fn parse_relevance_rows(
    payload: &Map<String, Value>,
) -> Result<Vec<TermRelevanceRow>, PayloadError> {
    let mut table = ColumnTable::from_payload(payload, "tinfo")?;
    let terms = table.strings("Term")?;
    let categories = table.strings("Category")?;
    let logprobs = table.numbers("logprob")?;
    let loglifts = table.numbers("loglift")?;
    let freqs = table.numbers("Freq")?;
    let totals = table.numbers("Total")?;

    let mut rows = Vec::with_capacity(terms.len());
    for (row, term) in terms.into_iter().enumerate() {
        let category = Category::parse(&categories[row]).ok_or_else(|| {
            PayloadError::malformed(
                "tinfo.Category",
                format!("row {row} has unknown category {:?}", categories[row]),
            )
        })?;

        rows.push(TermRelevanceRow {
            term,
            category,
            logprob: logprobs[row],
            loglift: loglifts[row],
            freq: freqs[row],
            total: totals[row],
        });
    }

    Ok(rows)
}

fn parse_memberships(
    payload: &Map<String, Value>,
) -> Result<Vec<TermTopicMembership>, PayloadError> {
    let mut table = ColumnTable::from_payload(payload, "token.table")?;
    let terms = table.strings("Term")?;
    let topics = table.numbers("Topic")?;
    let freqs = table.numbers("Freq")?;

    terms
        .into_iter()
        .zip(topics)
        .zip(freqs)
        .enumerate()
        .map(|(row, ((term, topic), freq))| {
            Ok(TermTopicMembership {
                term,
                topic: topic_id("token.table.Topic", row, topic)?,
                freq,
            })
        })
        .collect()
}

fn parse_plot_labels(payload: &Map<String, Value>) -> Result<PlotLabels, PayloadError> {
    let value = payload
        .get("plot.opts")
        .ok_or_else(|| PayloadError::malformed("plot.opts", "missing axis labels"))?;
    let options = RawPlotOptions::deserialize(value)
        .map_err(|error| PayloadError::malformed("plot.opts", error.to_string()))?;

    Ok(PlotLabels {
        x: options.xlab,
        y: options.ylab,
    })
}

fn parse_requested_terms(payload: &Map<String, Value>) -> Result<usize, PayloadError> {
    let value = payload
        .get("R")
        .ok_or_else(|| PayloadError::malformed("R", "missing"))?;

    match value.as_f64() {
        Some(count) if count.is_finite() && count >= 0.0 => Ok(count.round() as usize),
        _ => Err(PayloadError::malformed(
            "R",
            format!("expected a non-negative integer, got {value}"),
        )),
    }
}

fn parse_lambda_step(payload: &Map<String, Value>) -> Result<f64, PayloadError> {
    let value = payload
        .get("lambda.step")
        .ok_or_else(|| PayloadError::malformed("lambda.step", "missing"))?;

    match value.as_f64() {
        Some(step) if step.is_finite() && step > 0.0 && step <= 1.0 => Ok(step),
        _ => Err(PayloadError::malformed(
            "lambda.step",
            format!("expected a step in (0, 1], got {value}"),
        )),
    }
}

fn parse_topic_order(payload: &Map<String, Value>) -> Result<Vec<usize>, PayloadError> {
    let Some(value) = payload.get("topic.order") else {
        return Ok(Vec::new());
    };
    let cells = value
        .as_array()
        .ok_or_else(|| PayloadError::malformed("topic.order", "expected an array"))?;

    cells
        .iter()
        .enumerate()
        .map(|(row, cell)| {
            let number = cell.as_f64().ok_or_else(|| {
                PayloadError::malformed("topic.order", format!("row {row} is not numeric: {cell}"))
            })?;
            topic_id("topic.order", row, number)
        })
        .collect()
}

/// Reshapes the columnar payload into row collections.
///
/// The payload is trusted to be index-aligned across tables: the token table and the relevance
/// rows are never checked against the number of topics or against each other. Only missing or
/// mistyped members, and columns of unequal length inside one table, are rejected.
pub fn parse_payload(raw: &str) -> Result<TopicModelData, PayloadError> {
    let parsed: Value = serde_json::from_str(raw)
        .map_err(|error| PayloadError::malformed(ROOT_FIELD, format!("invalid JSON: {error}")))?;
    parse_payload_value(&parsed)
}

pub fn parse_payload_value(parsed: &Value) -> Result<TopicModelData, PayloadError> {
    let payload = parsed
        .as_object()
        .ok_or_else(|| PayloadError::malformed(ROOT_FIELD, "expected a JSON object"))?;

    let topics = parse_topics(payload)?;
    let relevance_rows = parse_relevance_rows(payload)?;
    let memberships = parse_memberships(payload)?;
    let labels = parse_plot_labels(payload)?;
    let requested_terms = parse_requested_terms(payload)?;
    let lambda_step = parse_lambda_step(payload)?;
    let topic_order = parse_topic_order(payload)?;

    Ok(TopicModelData::new(
        topics,
        memberships,
        relevance_rows,
        requested_terms,
        lambda_step,
        labels,
        topic_order,
    ))
}
