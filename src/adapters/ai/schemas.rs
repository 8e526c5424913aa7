//! Declared output schemas sent with each model request.
//!
//! Shapes follow the provider's OpenAPI-subset dialect (upper-case type
//! names). The model is asked to return key/value *lists* where the domain
//! uses maps; the gateway rebuilds the maps.

use serde_json::{json, Value};

fn string_array() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

pub fn domain_dna() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "domainName": { "type": "STRING" },
            "lexicon": string_array(),
            "behavioralRules": string_array(),
            "behavioralWeights": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "feature": { "type": "STRING" },
                        "weight": { "type": "NUMBER" }
                    },
                    "required": ["feature", "weight"]
                }
            },
            "latentCorrelators": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "trigger": { "type": "STRING" },
                        "result": { "type": "STRING" },
                        "logic": { "type": "STRING" }
                    },
                    "required": ["trigger", "result", "logic"]
                }
            },
            "segmentPrototypes": string_array(),
            "historicalFrictionPoints": string_array(),
            "maturityIndex": { "type": "NUMBER" }
        },
        "required": [
            "domainName", "lexicon", "behavioralRules", "behavioralWeights",
            "latentCorrelators", "segmentPrototypes", "historicalFrictionPoints", "maturityIndex"
        ]
    })
}

pub fn segments() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": { "type": "STRING" },
                "name": { "type": "STRING" },
                "description": { "type": "STRING" },
                "rationale": { "type": "STRING" },
                "characteristics": string_array(),
                "affinityScores": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "key": { "type": "STRING" },
                            "value": { "type": "NUMBER" }
                        },
                        "required": ["key", "value"]
                    }
                },
                "kpis": {
                    "type": "OBJECT",
                    "properties": {
                        "estimatedAov": { "type": "NUMBER" },
                        "ltvPotential": { "type": "STRING" },
                        "retentionLikelihood": { "type": "NUMBER" },
                        "churnPropensity": { "type": "NUMBER" }
                    },
                    "required": [
                        "estimatedAov",
                        "ltvPotential",
                        "retentionLikelihood",
                        "churnPropensity"
                    ]
                },
                "growthTrend": { "type": "STRING" },
                "preferredChannels": string_array(),
                "sampleSize": { "type": "NUMBER" },
                "patternStabilityIndex": { "type": "NUMBER" },
                "volatilityIndex": { "type": "NUMBER" }
            },
            "required": [
                "id", "name", "description", "rationale", "characteristics", "affinityScores",
                "kpis", "growthTrend", "preferredChannels", "sampleSize",
                "patternStabilityIndex", "volatilityIndex"
            ]
        }
    })
}

pub fn reviews() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": { "type": "STRING" },
                "rating": { "type": "NUMBER" },
                "content": { "type": "STRING" },
                "category": { "type": "STRING" }
            },
            "required": ["id", "rating", "content", "category"]
        }
    })
}

pub fn recommendations() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "targetSegment": { "type": "STRING" },
                "action": { "type": "STRING" },
                "rationale": { "type": "STRING" },
                "roiProjection": { "type": "STRING" },
                "metricLift": {
                    "type": "OBJECT",
                    "properties": {
                        "label": { "type": "STRING" },
                        "value": { "type": "STRING" }
                    },
                    "required": ["label", "value"]
                },
                "strategyType": { "type": "STRING" },
                "confidence": { "type": "NUMBER" },
                "complexity": { "type": "STRING" }
            },
            "required": [
                "title", "targetSegment", "action", "rationale", "roiProjection",
                "metricLift", "strategyType", "confidence", "complexity"
            ]
        }
    })
}

pub fn persona() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "backstory": { "type": "STRING" },
            "motivation": { "type": "STRING" },
            "churnRisks": string_array()
        },
        "required": ["backstory", "motivation", "churnRisks"]
    })
}

pub fn friction() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "frictionScore": { "type": "NUMBER" },
            "primaryGaps": string_array()
        },
        "required": ["frictionScore", "primaryGaps"]
    })
}

pub fn campaign_manifest() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "activationPlan": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "step": { "type": "STRING" },
                        "status": { "type": "STRING" },
                        "delay": { "type": "STRING" }
                    },
                    "required": ["step", "status", "delay"]
                }
            },
            "technicalHook": { "type": "STRING" },
            "adCopyDraft": { "type": "STRING" },
            "implementationPayload": { "type": "STRING" },
            "projectedMetrics": {
                "type": "OBJECT",
                "properties": {
                    "lift": { "type": "STRING" },
                    "roi": { "type": "STRING" },
                    "reach": { "type": "STRING" },
                    "volatilityRisk": { "type": "STRING" }
                },
                "required": ["lift", "roi", "reach", "volatilityRisk"]
            }
        },
        "required": [
            "activationPlan", "technicalHook", "adCopyDraft",
            "implementationPayload", "projectedMetrics"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_are_declared_as_pair_list() {
        let schema = domain_dna();
        assert_eq!(schema["properties"]["behavioralWeights"]["type"], "ARRAY");
        assert_eq!(
            schema["properties"]["behavioralWeights"]["items"]["required"],
            json!(["feature", "weight"])
        );
    }

    #[test]
    fn list_operations_declare_arrays() {
        for schema in [segments(), reviews(), recommendations()] {
            assert_eq!(schema["type"], "ARRAY");
        }
        for schema in [domain_dna(), persona(), friction(), campaign_manifest()] {
            assert_eq!(schema["type"], "OBJECT");
        }
    }
}
