//! Non-interactive subcommands.

use color_eyre::{eyre::WrapErr, Result};
use segment::{DraftSession, FieldDescriptor, SegmentGateway};

/// Render the catalog as an aligned table, one field per line.
pub fn fields_table(fields: &[FieldDescriptor]) -> String {
    let width = fields.iter().map(|d| d.id.key().len()).max().unwrap_or(0);
    let mut out = String::new();
    for d in fields {
        out.push_str(&format!(
            "{:<width$}  {:<14}  {}\n",
            d.id.key(),
            d.label,
            d.trait_type.label(),
        ));
    }
    out
}

pub fn print_fields(json: bool) -> Result<()> {
    let fields = segment::all_fields();
    if json {
        println!("{}", serde_json::to_string_pretty(fields)?);
    } else {
        print!("{}", fields_table(fields));
    }
    Ok(())
}

/// Fill a fresh draft from command line input. Unknown keys and repeated
/// fields are rejected the same way the panel rejects them.
pub fn draft_from_args(name: &str, keys: &[String]) -> Result<DraftSession> {
    let mut session = DraftSession::new();
    session.set_name(name);
    for key in keys {
        let descriptor = segment::lookup(key).wrap_err_with(|| format!("--field {key}"))?;
        session
            .selection_mut()
            .add(descriptor.id)
            .wrap_err_with(|| format!("--field {key}"))?;
    }
    Ok(session)
}

/// Headless save: build the draft, send it once and report the outcome.
pub async fn submit<G>(gateway: &G, name: &str, keys: &[String]) -> Result<()>
where
    G: SegmentGateway + ?Sized,
{
    let mut session = draft_from_args(name, keys)?;
    match session.submit(gateway).await {
        Ok(response) => {
            println!("Segment saved successfully! (HTTP {})", response.status);
            if !response.body.is_null() {
                println!("{}", serde_json::to_string_pretty(&response.body)?);
            }
            Ok(())
        }
        Err(e) => {
            let notice = e.notice();
            Err(e).wrap_err(notice)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use segment::{Error, SchemaField, SegmentPayload, ServerResponse};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture(Mutex<Vec<SegmentPayload>>);

    #[async_trait]
    impl SegmentGateway for Capture {
        async fn submit(&self, payload: &SegmentPayload) -> segment::Result<ServerResponse> {
            self.0.lock().unwrap().push(payload.clone());
            Ok(ServerResponse::from_body(201, ""))
        }
    }

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn table_lists_every_field() {
        let table = fields_table(segment::all_fields());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("first_name"));
        assert!(lines[0].ends_with("User Traits"));
        assert!(lines[4].starts_with("account_name"));
        assert!(lines[6].ends_with("Group Traits"));
    }

    #[test]
    fn draft_accepts_case_insensitive_keys() {
        let session = draft_from_args("x", &keys(&["First_Name", " city "])).unwrap();
        assert_eq!(
            session.selection().as_slice(),
            &[SchemaField::FirstName, SchemaField::City]
        );
    }

    #[test]
    fn draft_rejects_unknown_and_repeated_keys() {
        let err = draft_from_args("x", &keys(&["email"])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnknownField(_))
        ));

        let err = draft_from_args("x", &keys(&["age", "age"])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::DuplicateField(SchemaField::Age))
        ));
    }

    #[tokio::test]
    async fn submit_sends_one_payload() {
        let gateway = Capture::default();
        submit(&gateway, "blog", &keys(&["age", "state"])).await.unwrap();
        let seen = gateway.0.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].field_keys().collect::<Vec<_>>(),
            vec!["age", "state"]
        );
    }

    #[tokio::test]
    async fn submit_reports_validation_notice() {
        let gateway = Capture::default();
        let err = submit(&gateway, "  ", &keys(&["age"])).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing Segment Name");
        assert!(gateway.0.lock().unwrap().is_empty());
    }
}
