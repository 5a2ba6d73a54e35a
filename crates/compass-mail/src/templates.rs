use tera::{Context, Tera};

use crate::error::MailError;
use crate::mailer::Email;

const WELCOME: &str = "\
Hi {{ name }},

Welcome to Compass. Your account is ready, and you can start your first
assessment at {{ public_url }}.

The Compass team
";

const EVALUATOR_INVITATION: &str = "\
Hi {{ evaluator_name }},

{{ subject_name }} has asked you for 360° feedback as their {{ relationship }}.
It takes about ten minutes and your answers are only shown in aggregate.

Start here: {{ link }}

The Compass team
";

const ASSESSMENT_COMPLETED: &str = "\
Hi {{ name }},

Your {{ assessment }} assessment is complete. Your strongest result is
{{ dominant }}.

See the full breakdown at {{ public_url }}/results.

The Compass team
";

fn engine() -> Result<Tera, MailError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("welcome.txt", WELCOME),
        ("evaluator_invitation.txt", EVALUATOR_INVITATION),
        ("assessment_completed.txt", ASSESSMENT_COMPLETED),
    ])?;
    Ok(tera)
}

fn render(template: &str, context: &Context) -> Result<String, MailError> {
    Ok(engine()?.render(template, context)?)
}

/// Public link an evaluator follows to answer.
pub fn evaluation_link(public_url: &str, token: &str) -> String {
    format!("{}/evaluate/{token}", public_url.trim_end_matches('/'))
}

pub fn welcome(to: &str, name: &str, public_url: &str) -> Result<Email, MailError> {
    let mut context = Context::new();
    context.insert("name", name);
    context.insert("public_url", public_url);
    Ok(Email {
        to: to.to_string(),
        to_name: Some(name.to_string()),
        subject: "Welcome to Compass".into(),
        body: render("welcome.txt", &context)?,
    })
}

pub fn evaluator_invitation(
    to: &str,
    evaluator_name: &str,
    subject_name: &str,
    relationship: &str,
    link: &str,
) -> Result<Email, MailError> {
    let mut context = Context::new();
    context.insert("evaluator_name", evaluator_name);
    context.insert("subject_name", subject_name);
    context.insert("relationship", relationship);
    context.insert("link", link);
    Ok(Email {
        to: to.to_string(),
        to_name: Some(evaluator_name.to_string()),
        subject: format!("{subject_name} would like your feedback"),
        body: render("evaluator_invitation.txt", &context)?,
    })
}

pub fn assessment_completed(
    to: &str,
    name: &str,
    assessment: &str,
    dominant: &str,
    public_url: &str,
) -> Result<Email, MailError> {
    let mut context = Context::new();
    context.insert("name", name);
    context.insert("assessment", assessment);
    context.insert("dominant", dominant);
    context.insert("public_url", public_url.trim_end_matches('/'));
    Ok(Email {
        to: to.to_string(),
        to_name: Some(name.to_string()),
        subject: format!("Your {assessment} results are ready"),
        body: render("assessment_completed.txt", &context)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invitation_carries_the_token_link() {
        let link = evaluation_link("https://app.compass.test/", "tok123");
        assert_eq!(link, "https://app.compass.test/evaluate/tok123");

        let email =
            evaluator_invitation("bob@example.com", "Bob", "Ada", "peer", &link).unwrap();
        assert_eq!(email.subject, "Ada would like your feedback");
        assert!(email.body.contains("as their peer"));
        assert!(email.body.contains(&link));
    }

    #[test]
    fn completion_names_the_assessment() {
        let email = assessment_completed(
            "ada@example.com",
            "Ada",
            "Wellness",
            "Purpose",
            "http://localhost:3000",
        )
        .unwrap();
        assert!(email.subject.contains("Wellness"));
        assert!(email.body.contains("strongest result is\nPurpose"));
        assert!(email.body.contains("http://localhost:3000/results"));
    }

    #[test]
    fn welcome_greets_by_name() {
        let email = welcome("ada@example.com", "Ada", "http://localhost:3000").unwrap();
        assert!(email.body.starts_with("Hi Ada,"));
    }
}
