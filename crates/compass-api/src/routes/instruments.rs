use axum::Json;
use axum::extract::Path;
use serde::Serialize;

use compass_instruments::scoring::Category;
use compass_instruments::{all_instruments, get_instrument};

use crate::error::ApiError;

#[derive(Serialize)]
pub struct InstrumentSummary {
    id: String,
    name: String,
    /// Whether the instrument is answered as a questionnaire.
    questionnaire: bool,
}

#[derive(Serialize)]
pub struct InstrumentDetail {
    id: String,
    name: String,
    categories: Vec<Category>,
    question_count: usize,
}

pub async fn list_instruments() -> Json<Vec<InstrumentSummary>> {
    let instruments: Vec<InstrumentSummary> = all_instruments()
        .iter()
        .map(|i| InstrumentSummary {
            id: i.id().to_string(),
            name: i.name().to_string(),
            questionnaire: !i.default_questions().is_empty(),
        })
        .collect();
    Json(instruments)
}

pub async fn get_instrument_detail(
    Path(id): Path<String>,
) -> Result<Json<InstrumentDetail>, ApiError> {
    let instrument = get_instrument(&id)
        .ok_or_else(|| ApiError::NotFound(format!("instrument not found: {id}")))?;

    Ok(Json(InstrumentDetail {
        id: instrument.id().to_string(),
        name: instrument.name().to_string(),
        categories: instrument.categories().to_vec(),
        question_count: instrument.default_questions().len(),
    }))
}
