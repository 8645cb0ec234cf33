use std::sync::Arc;

use rowstream::schema::{RecordSchema, RecordSchemaBuilder};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: u32,
    pub email: Option<String>,
}

pub fn person_schema() -> Arc<RecordSchema<Person>> {
    RecordSchemaBuilder::new()
        .column("Name", |p: &Person| p.name.clone(), |p, v| p.name = v)
        .column("Age", |p: &Person| p.age, |p, v| p.age = v)
        .column("Email", |p: &Person| p.email.clone(), |p, v| p.email = v)
        .build()
        .expect("valid schema")
}

pub fn sample_people() -> Vec<Person> {
    vec![
        Person {
            name: "John".to_string(),
            age: 30,
            email: Some("john@example.com".to_string()),
        },
        Person {
            name: "Jane".to_string(),
            age: 25,
            email: None,
        },
        Person {
            name: "Ada".to_string(),
            age: 36,
            email: Some("ada@example.com".to_string()),
        },
    ]
}
