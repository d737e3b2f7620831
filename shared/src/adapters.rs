use crate::core::{InsertOutcome, Record, UrlRepository};
use async_trait::async_trait;
use aws_sdk_dynamodb::{operation::put_item::PutItemError, types::AttributeValue, Client};
use std::collections::HashMap;

const ID_ATTRIBUTE: &str = "ID";
const LONG_URL_ATTRIBUTE: &str = "LongURL";

#[derive(Debug)]
pub struct DynamoDbUrlRepository {
    table_name: String,
    dynamodb_client: Client,
}

impl DynamoDbUrlRepository {
    pub fn new(table_name: String, dynamodb_client: Client) -> Self {
        Self {
            table_name,
            dynamodb_client,
        }
    }
}

#[async_trait]
impl UrlRepository for DynamoDbUrlRepository {
    #[tracing::instrument(skip(self))]
    async fn get_long_url(&self, code: &str) -> Result<Option<String>, String> {
        self.dynamodb_client
            .get_item()
            .table_name(&self.table_name)
            .key(ID_ATTRIBUTE, AttributeValue::S(code.to_string()))
            .send()
            .await
            .map(|record| long_url_from_item(record.item.as_ref()))
            .map_err(|e| format!("Error getting item: {:?}", e))
    }

    #[tracing::instrument(skip(self, record), fields(code = %record.code))]
    async fn put_record(&self, record: &Record) -> Result<(), String> {
        self.dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item_from_record(record)))
            .send()
            .await
            .map(|_| ())
            .map_err(|e| format!("Error adding item: {:?}", e))
    }

    #[tracing::instrument(skip(self, record), fields(code = %record.code))]
    async fn insert_record_if_absent(&self, record: &Record) -> Result<InsertOutcome, String> {
        let result = self
            .dynamodb_client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item_from_record(record)))
            .condition_expression("attribute_not_exists(#id)")
            .expression_attribute_names("#id", ID_ATTRIBUTE)
            .send()
            .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(e) => {
                let generic_err_msg = format!("Error adding item: {:?}", e);
                outcome_of_rejected_insert(e.into_service_error(), generic_err_msg)
            }
        }
    }
}

// only a failed `attribute_not_exists` condition means the code is taken
fn outcome_of_rejected_insert(
    error: PutItemError,
    generic_err_msg: String,
) -> Result<InsertOutcome, String> {
    if error.is_conditional_check_failed_exception() {
        Ok(InsertOutcome::AlreadyExists)
    } else {
        Err(generic_err_msg)
    }
}

fn item_from_record(record: &Record) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            ID_ATTRIBUTE.to_string(),
            AttributeValue::S(record.code.clone()),
        ),
        (
            LONG_URL_ATTRIBUTE.to_string(),
            AttributeValue::S(record.long_url.clone()),
        ),
    ])
}

// a missing item and an item without a string LongURL both read as "no record"
fn long_url_from_item(item: Option<&HashMap<String, AttributeValue>>) -> Option<String> {
    item.and_then(|attributes| attributes.get(LONG_URL_ATTRIBUTE))
        .and_then(|v| v.as_s().cloned().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::types::error::{
        ConditionalCheckFailedException, ResourceNotFoundException,
    };

    #[test]
    fn record_maps_to_id_and_long_url_attributes() {
        let item = item_from_record(&Record::new(
            "abcDEF12".to_string(),
            "https://example.com".to_string(),
        ));

        assert_eq!(item.len(), 2);
        assert_eq!(
            item.get("ID"),
            Some(&AttributeValue::S("abcDEF12".to_string()))
        );
        assert_eq!(
            item.get("LongURL"),
            Some(&AttributeValue::S("https://example.com".to_string()))
        );
    }

    #[test]
    fn long_url_is_read_from_item() {
        let item = item_from_record(&Record::new(
            "abcDEF12".to_string(),
            "https://example.com".to_string(),
        ));

        assert_eq!(
            long_url_from_item(Some(&item)),
            Some("https://example.com".to_string())
        );
    }

    #[test]
    fn missing_item_has_no_long_url() {
        assert_eq!(long_url_from_item(None), None);
    }

    #[test]
    fn item_without_long_url_attribute_has_no_long_url() {
        let item = HashMap::from([(
            "ID".to_string(),
            AttributeValue::S("abcDEF12".to_string()),
        )]);

        assert_eq!(long_url_from_item(Some(&item)), None);
    }

    #[test]
    fn non_string_long_url_is_ignored() {
        let item = HashMap::from([(
            "LongURL".to_string(),
            AttributeValue::N("42".to_string()),
        )]);

        assert_eq!(long_url_from_item(Some(&item)), None);
    }

    #[test]
    fn failed_condition_means_code_is_taken() {
        let error = PutItemError::ConditionalCheckFailedException(
            ConditionalCheckFailedException::builder()
                .message("The conditional request failed")
                .build(),
        );

        let outcome = outcome_of_rejected_insert(error, "Error adding item".to_string());

        assert_eq!(outcome, Ok(InsertOutcome::AlreadyExists));
    }

    #[test]
    fn other_put_errors_are_passed_up() {
        let error = PutItemError::ResourceNotFoundException(
            ResourceNotFoundException::builder()
                .message("Requested resource not found")
                .build(),
        );

        let outcome =
            outcome_of_rejected_insert(error, "Error adding item: table missing".to_string());

        assert_eq!(outcome, Err("Error adding item: table missing".to_string()));
    }
}
