use serde_json::{Value, json};

use super::{TopicModelData, parse_payload_value};

/// Three topics, R = 5. Topic 2 carries seven candidate terms whose order changes with lambda,
/// topic 3 has no candidate rows at all.
pub fn sample_payload() -> Value {
    json!({
        "mdsDat": {
            "x": [0.2, -0.1, 0.0],
            "y": [0.1, 0.05, -0.2],
            "topics": [1, 2, 3],
            "cluster": [1, 1, 1],
            "Freq": [50.0, 30.0, 20.0]
        },
        "tinfo": {
            "Term": [
                "loan", "bank", "river", "apple", "water",
                "apple", "orchard", "bank",
                "river", "bank", "water", "boat", "fish", "loan", "shore"
            ],
            "Category": [
                "Default", "Default", "Default", "Default", "Default",
                "Topic1", "Topic1", "Topic1",
                "Topic2", "Topic2", "Topic2", "Topic2", "Topic2", "Topic2", "Topic2"
            ],
            "logprob": [
                5, 4, 3, 2, 1,
                -1.0, -2.0, -3.0,
                -2.0, -2.5, -3.0, -3.5, -4.0, -1.5, -5.0
            ],
            "loglift": [
                5, 4, 3, 2, 1,
                1.0, 2.0, 0.5,
                0.5, 1.5, 2.5, 3.2, 2.0, -0.5, 3.5
            ],
            "Freq": [
                200, 150, 70, 60, 45,
                55, 20, 40,
                40, 30, 20, 10, 8, 50, 4
            ],
            "Total": [
                200, 150, 70, 60, 45,
                60, 21, 150,
                60, 90, 25, 12, 30, 200, 5
            ]
        },
        "token.table": {
            "Term": ["apple", "bank", "bank", "river", "river", "water"],
            "Topic": [1, 1, 2, 1, 2, 2],
            "Freq": [1.0, 0.3, 0.7, 0.1, 0.9, 1.0]
        },
        "R": 5,
        "lambda.step": 0.1,
        "plot.opts": { "xlab": "PC1", "ylab": "PC2" },
        "topic.order": [1, 2, 3]
    })
}

pub fn sample_model() -> TopicModelData {
    match parse_payload_value(&sample_payload()) {
        Ok(data) => data,
        Err(error) => panic!("fixture payload must parse: {error}"),
    }
}
