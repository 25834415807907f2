//! Nested calls: a model that calls other models inside its own call

#[path = "support/mock_model.rs"]
mod support;

use async_trait::async_trait;
use callflow::prelude::*;
use callflow::EventRecorder;
use serde_json::json;
use support::{MockModel, recorded_options};

/// Drafts with one model, then refines with another.
struct TwoStepModel {
    drafter: MockModel,
    refiner: MockModel,
}

impl Model for TwoStepModel {
    fn model_information(&self) -> ModelInformation {
        ModelInformation::new("composite", "two-step")
    }
}

#[async_trait]
impl TextGenerationModel for TwoStepModel {
    type Prompt = String;

    async fn do_generate_text(
        &self,
        prompt: &String,
        options: FunctionOptions,
    ) -> Result<GenerateResponse<String>, ModelError> {
        let draft = generate_text(&self.drafter, prompt, &options).await?;
        let refined = generate_text(&self.refiner, &draft.value, &options).await?;
        Ok(GenerateResponse::new(
            json!({ "draft": draft.value, "final": refined.value }),
            refined.value,
        ))
    }
}

#[tokio::test]
async fn inner_calls_link_to_their_parent() {
    let model = TwoStepModel {
        drafter: MockModel::replying("rough draft"),
        refiner: MockModel::replying("polished"),
    };
    let recorder = EventRecorder::new();
    let run = Run::builder().run_id("run-nested").build();
    let options = recorded_options(&recorder).with_run(run);

    let response = generate_text(&model, &"write".to_string(), &options)
        .await
        .unwrap();

    assert_eq!(response.value, "polished");
    let outer_id = response.metadata.call_id.clone();
    assert_eq!(response.metadata.parent_call_id, None);

    let events = recorder.events();
    assert_eq!(events.len(), 6);

    let inner: Vec<_> = events
        .iter()
        .filter(|event| event.call_id() != outer_id)
        .collect();
    assert_eq!(inner.len(), 4);
    for event in &inner {
        assert_eq!(event.metadata().parent_call_id.as_deref(), Some(outer_id.as_str()));
        assert_eq!(event.metadata().run_id.as_deref(), Some("run-nested"));
        assert_eq!(event.metadata().model.provider, "mock");
    }

    // outer started first and finished last
    assert_eq!(events.first().unwrap().call_id(), outer_id);
    assert_eq!(events.last().unwrap().call_id(), outer_id);
    assert_eq!(events.last().unwrap().event_type(), "finished");

    // each inner call is a complete started/finished pair
    let inner_ids: Vec<&str> = inner.iter().map(|event| event.call_id()).collect();
    assert_eq!(inner_ids[0], inner_ids[1]);
    assert_eq!(inner_ids[2], inner_ids[3]);
    assert_ne!(inner_ids[0], inner_ids[2]);
}

#[tokio::test]
async fn aborting_the_run_stops_inner_calls() {
    let model = TwoStepModel {
        drafter: MockModel::replying("draft"),
        refiner: MockModel::replying("never"),
    };
    let recorder = EventRecorder::new();
    let run = Run::builder().build();

    // the abort fires as soon as the drafter's call finishes
    let trigger = run.clone();
    let options = recorded_options(&recorder)
        .with_run(run)
        .with_observer(observer_fn(move |event| {
            if event.metadata().parent_call_id.is_some() && event.result().is_some() {
                trigger.abort();
            }
            Ok(())
        }));

    let err = generate_text(&model, &"write".to_string(), &options)
        .await
        .unwrap_err();

    assert!(err.is_abort());
    assert_eq!(model.refiner.attempts(), 0);
    let events = recorder.events();
    let finished: Vec<_> = events.iter().filter(|event| event.result().is_some()).collect();
    assert!(finished.iter().all(|event| {
        event.metadata().parent_call_id.is_some() || event.result() == Some(&callflow::ModelCallResult::Abort)
    }));
}
