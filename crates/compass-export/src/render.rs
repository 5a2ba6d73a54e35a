use serde::Serialize;
use tera::{Context, Tera};

use compass_core::models::assessment_type::AssessmentType;
use compass_core::models::result::AssessmentResult;
use compass_instruments::Instrument;
use compass_instruments::instruments::tki::MODE_CEILING;
use compass_instruments::scoring::CategoryComparison;

use crate::error::ExportError;

const REPORT_TEMPLATE_NAME: &str = "report.md";

const REPORT_TEMPLATE: &str = r#"# {{ title }}

**Prepared for:** {{ user_name }}
**Completed:** {{ completed_at }}

## Summary

**Result:** {{ dominant_label }}
{% if has_overall %}**Overall score:** {{ overall_score }}
{% endif %}
## Scores

{% for c in categories %}| {{ c.name }} | {{ c.display }} |
{% endfor %}{% if comparison | length > 0 %}
## Self and Others

{% for row in comparison %}- **{{ row.name }}:** self {{ row.self_display }}, others {{ row.others_display }}, gap {{ row.gap_display }} ({{ row.evaluator_count }} evaluators)
{% endfor %}{% endif %}
## About the Categories
{% for c in categories %}{% if c.description %}
### {{ c.name }}
{{ c.description }}
{% endif %}{% endfor %}
Generated {{ generated_at }}.
"#;

/// Everything a report template can reference. Values are preformatted.
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub title: String,
    pub user_name: String,
    pub completed_at: String,
    pub dominant_label: String,
    pub has_overall: bool,
    pub overall_score: String,
    pub categories: Vec<ReportCategory>,
    pub comparison: Vec<ReportComparison>,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportCategory {
    pub name: String,
    pub description: Option<String>,
    pub display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportComparison {
    pub name: String,
    pub self_display: String,
    pub others_display: String,
    pub gap_display: String,
    pub evaluator_count: usize,
}

impl ReportData {
    /// Build report data for a stored result. `comparison` is only used for
    /// 360° results.
    pub fn from_result(
        instrument: &dyn Instrument,
        result: &AssessmentResult,
        user_name: &str,
        comparison: &[CategoryComparison],
        now: jiff::Timestamp,
    ) -> Self {
        let assessment_type = result.assessment_type;
        let categories = instrument
            .categories()
            .iter()
            .filter_map(|category| {
                let value = *result.scores.get(&category.id)?;
                Some(ReportCategory {
                    name: category.name.clone(),
                    description: category.description.clone(),
                    display: display_score(assessment_type, &category.name, value),
                })
            })
            .collect();

        let name_of = |id: &str| {
            instrument
                .categories()
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| id.to_string())
        };

        let comparison = if assessment_type == AssessmentType::ThreeSixty {
            comparison
                .iter()
                .map(|row| ReportComparison {
                    name: name_of(&row.category),
                    self_display: percent_or_dash(row.self_score),
                    others_display: percent_or_dash(row.others_score),
                    gap_display: row
                        .gap
                        .map(|g| format!("{g:+.1}"))
                        .unwrap_or_else(|| "-".to_string()),
                    evaluator_count: row.evaluator_count,
                })
                .collect()
        } else {
            Vec::new()
        };

        Self {
            title: format!("{} Report", instrument.name()),
            user_name: user_name.to_string(),
            completed_at: result.completed_at.strftime("%Y-%m-%d").to_string(),
            dominant_label: name_of(&result.dominant_result),
            has_overall: result.overall_score.is_some(),
            overall_score: result
                .overall_score
                .map(|s| format!("{s:.1} / 100"))
                .unwrap_or_default(),
            categories,
            comparison,
            generated_at: now.strftime("%Y-%m-%d %H:%M UTC").to_string(),
        }
    }
}

fn display_score(assessment_type: AssessmentType, category_name: &str, value: f64) -> String {
    match assessment_type {
        AssessmentType::Tki => format!("{value} of {MODE_CEILING}"),
        // Category names read "Extraversion / Introversion"; 1.0 is the first.
        AssessmentType::Mbti => {
            let mut sides = category_name.split(" / ");
            let first = sides.next().unwrap_or(category_name);
            let second = sides.next().unwrap_or(category_name);
            let side = if value >= 1.0 { first } else { second };
            side.to_string()
        }
        AssessmentType::ThreeSixty | AssessmentType::Wellness => format!("{value:.1}%"),
    }
}

fn percent_or_dash(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.1}%"))
        .unwrap_or_else(|| "-".to_string())
}

/// Render a Tera template with any serializable context.
pub fn render_template<T: Serialize>(
    template_name: &str,
    template_content: &str,
    data: &T,
) -> Result<String, ExportError> {
    let mut tera = Tera::default();
    tera.add_raw_template(template_name, template_content)
        .map_err(|e| ExportError::TemplateParse(e.to_string()))?;

    let value = serde_json::to_value(data)?;
    let context =
        Context::from_value(value).map_err(|e| ExportError::TemplateRender(e.to_string()))?;

    Ok(tera.render(template_name, &context)?)
}

/// Render the standard report body.
pub fn render_report(data: &ReportData) -> Result<String, ExportError> {
    render_template(REPORT_TEMPLATE_NAME, REPORT_TEMPLATE, data)
}
