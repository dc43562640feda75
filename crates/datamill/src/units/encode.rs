//! Categorical encoders.
//!
//! Both encoders learn their category vocabulary from the first batch
//! (distinct non-null values, sorted) and keep it for the life of the unit.
//! They differ in how they treat values outside the vocabulary: the one-hot
//! encoder maps them to an all-zero indicator row, the label encoder rejects
//! them, since a silently invented code would corrupt downstream arithmetic.

use std::collections::{BTreeSet, HashMap};

use polars::prelude::*;
use serde::Deserialize;

use crate::error::{PipelineError, Result};
use crate::unit::{impl_unit_spec, FitState, OutputKind, TransformUnit};
use crate::utils;

fn string_column(df: &DataFrame, name: &str) -> Result<Series> {
    Ok(utils::column(df, name)?.cast(&DataType::String)?)
}

fn learned_categories(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let casted = string_column(df, name)?;
    let distinct: BTreeSet<String> = casted
        .str()?
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();
    Ok(distinct.into_iter().collect())
}

/// Expand each watched column into one `{col}_{category}` indicator column
/// per learned category. Nulls and unseen values produce an all-zero row.
#[derive(Deserialize)]
pub struct OneHotEncoder {
    cols: Vec<String>,
    #[serde(skip)]
    state: FitState<Vec<Vec<String>>>,
}

impl OneHotEncoder {
    pub fn new(cols: Vec<String>) -> Self {
        Self {
            cols,
            state: FitState::default(),
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_fitted()
    }
}

impl TransformUnit for OneHotEncoder {
    fn apply(&mut self, df: DataFrame) -> Result<DataFrame> {
        let vocabularies = self.state.fit_once(|| {
            self.cols
                .iter()
                .map(|name| learned_categories(&df, name))
                .collect()
        })?;

        let mut columns = Vec::new();
        for (name, categories) in self.cols.iter().zip(vocabularies) {
            let casted = string_column(&df, name)?;
            let ca = casted.str()?;
            for category in categories {
                let indicator: Int32Chunked = ca
                    .into_iter()
                    .map(|v| Some(i32::from(v == Some(category.as_str()))))
                    .collect();
                let mut series = indicator.into_series();
                series.rename(format!("{}_{}", name, category).into());
                columns.push(series.into_column());
            }
        }
        Ok(DataFrame::new(columns)?)
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::NewColumns
    }

    fn name(&self) -> &'static str {
        "one_hot"
    }
}

impl_unit_spec!(OneHotEncoder, "one_hot");

/// Rewrite each watched column as integer codes, assigned by sorted category
/// order. Nulls stay null; an unseen value is an error.
#[derive(Deserialize)]
pub struct LabelEncoder {
    cols: Vec<String>,
    #[serde(skip)]
    state: FitState<Vec<Vec<String>>>,
}

impl LabelEncoder {
    pub fn new(cols: Vec<String>) -> Self {
        Self {
            cols,
            state: FitState::default(),
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_fitted()
    }
}

impl TransformUnit for LabelEncoder {
    fn apply(&mut self, df: DataFrame) -> Result<DataFrame> {
        let vocabularies = self.state.fit_once(|| {
            self.cols
                .iter()
                .map(|name| learned_categories(&df, name))
                .collect()
        })?;

        let mut df = df;
        for (name, categories) in self.cols.iter().zip(vocabularies) {
            let index: HashMap<&str, i64> = categories
                .iter()
                .enumerate()
                .map(|(code, category)| (category.as_str(), code as i64))
                .collect();

            let casted = string_column(&df, name)?;
            let mut codes: Vec<Option<i64>> = Vec::with_capacity(casted.len());
            for value in casted.str()?.into_iter() {
                match value {
                    None => codes.push(None),
                    Some(value) => match index.get(value) {
                        Some(&code) => codes.push(Some(code)),
                        None => {
                            return Err(PipelineError::UnknownCategory {
                                column: name.clone(),
                                value: value.to_string(),
                            });
                        }
                    },
                }
            }

            let mut encoded = codes.into_iter().collect::<Int64Chunked>().into_series();
            encoded.rename(name.as_str().into());
            df.replace(name, encoded)?;
        }
        Ok(df)
    }

    fn output_kind(&self) -> OutputKind {
        OutputKind::Rewrite
    }

    fn name(&self) -> &'static str {
        "label_encode"
    }
}

impl_unit_spec!(LabelEncoder, "label_encode");

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df!["color" => ["red", "blue", "red", "green"]].unwrap()
    }

    #[test]
    fn test_one_hot_emits_sorted_indicator_columns() {
        let mut encoder = OneHotEncoder::new(vec!["color".to_string()]);
        let out = encoder.apply(sample()).unwrap();

        assert_eq!(
            out.get_column_names()
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>(),
            vec!["color_blue", "color_green", "color_red"]
        );
        let red = out.column("color_red").unwrap();
        assert_eq!(red.get(0).unwrap().try_extract::<i32>().unwrap(), 1);
        assert_eq!(red.get(1).unwrap().try_extract::<i32>().unwrap(), 0);
    }

    #[test]
    fn test_one_hot_unseen_value_becomes_all_zero() {
        let mut encoder = OneHotEncoder::new(vec!["color".to_string()]);
        encoder.apply(sample()).unwrap();

        let second = df!["color" => ["purple"]].unwrap();
        let out = encoder.apply(second).unwrap();
        for name in ["color_blue", "color_green", "color_red"] {
            let col = out.column(name).unwrap();
            assert_eq!(col.get(0).unwrap().try_extract::<i32>().unwrap(), 0);
        }
    }

    #[test]
    fn test_one_hot_null_becomes_all_zero() {
        let df = df!["color" => [Some("red"), None]].unwrap();
        let mut encoder = OneHotEncoder::new(vec!["color".to_string()]);
        let out = encoder.apply(df).unwrap();

        let red = out.column("color_red").unwrap();
        assert_eq!(red.get(1).unwrap().try_extract::<i32>().unwrap(), 0);
    }

    #[test]
    fn test_label_encode_assigns_sorted_codes() {
        let mut encoder = LabelEncoder::new(vec!["color".to_string()]);
        let out = encoder.apply(sample()).unwrap();

        let codes = out.column("color").unwrap();
        // blue=0, green=1, red=2
        assert_eq!(codes.get(0).unwrap().try_extract::<i64>().unwrap(), 2);
        assert_eq!(codes.get(1).unwrap().try_extract::<i64>().unwrap(), 0);
        assert_eq!(codes.get(3).unwrap().try_extract::<i64>().unwrap(), 1);
    }

    #[test]
    fn test_label_encode_null_stays_null() {
        let df = df!["color" => [Some("red"), None]].unwrap();
        let mut encoder = LabelEncoder::new(vec!["color".to_string()]);
        let out = encoder.apply(df).unwrap();
        assert_eq!(out.column("color").unwrap().null_count(), 1);
    }

    #[test]
    fn test_label_encode_rejects_unseen_value() {
        let mut encoder = LabelEncoder::new(vec!["color".to_string()]);
        encoder.apply(sample()).unwrap();

        let second = df!["color" => ["purple"]].unwrap();
        let err = encoder.apply(second).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::UnknownCategory { ref column, ref value }
                if column == "color" && value == "purple"
        ));
    }

    #[test]
    fn test_vocabulary_is_learned_once() {
        let mut encoder = LabelEncoder::new(vec!["color".to_string()]);
        let first = df!["color" => ["b", "a"]].unwrap();
        encoder.apply(first).unwrap();
        assert!(encoder.is_fitted());

        // "c" was not in the first batch, so it stays unknown even though a
        // fresh fit on this batch would accept it.
        let second = df!["color" => ["c"]].unwrap();
        assert!(encoder.apply(second).is_err());
    }
}
