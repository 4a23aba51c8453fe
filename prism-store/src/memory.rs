// Copyright 2025 Prism Assessments (https://github.com/prism-assess)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Lock-guarded hash-map tables implementing the repository contract.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use uuid::Uuid;

use prism_core::{
    Assessment, Candidate, Domain, Item, PerformanceModel, PrismError, Repository, Response,
    Result, Scale, ScaleScore,
};

/// In-memory repository. Each method takes one lock and is atomic;
/// response vectors preserve append order, which is the ordering contract
/// the session layer depends on.
#[derive(Default)]
pub struct MemoryStore {
    scales: RwLock<BTreeMap<String, Scale>>,
    items: RwLock<HashMap<Uuid, Item>>,
    candidates: RwLock<HashMap<Uuid, Candidate>>,
    assessments: RwLock<HashMap<Uuid, Assessment>>,
    responses: RwLock<HashMap<Uuid, Vec<Response>>>,
    scores: RwLock<HashMap<Uuid, Vec<ScaleScore>>>,
    models: RwLock<HashMap<Uuid, PerformanceModel>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate(kind: &str, id: impl std::fmt::Display) -> PrismError {
    PrismError::Repository(format!("duplicate {kind}: {id}"))
}

impl Repository for MemoryStore {
    fn insert_scale(&self, scale: Scale) -> Result<()> {
        let mut scales = self.scales.write();
        if scales.contains_key(&scale.id) {
            return Err(duplicate("scale", &scale.id));
        }
        scales.insert(scale.id.clone(), scale);
        Ok(())
    }

    fn scale(&self, id: &str) -> Result<Option<Scale>> {
        Ok(self.scales.read().get(id).cloned())
    }

    fn scales_in_domain(&self, domain: Domain) -> Result<Vec<Scale>> {
        // BTreeMap iteration gives deterministic id order
        Ok(self
            .scales
            .read()
            .values()
            .filter(|scale| scale.domain == domain)
            .cloned()
            .collect())
    }

    fn insert_item(&self, item: Item) -> Result<()> {
        item.validate()?;
        let mut items = self.items.write();
        if items.contains_key(&item.id) {
            return Err(duplicate("item", item.id));
        }
        items.insert(item.id, item);
        Ok(())
    }

    fn item(&self, id: Uuid) -> Result<Option<Item>> {
        Ok(self.items.read().get(&id).cloned())
    }

    fn active_items_in_domain(&self, domain: Domain) -> Result<Vec<Item>> {
        let mut items: Vec<Item> = self
            .items
            .read()
            .values()
            .filter(|item| item.active && item.domain == domain)
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            a.scale_id
                .cmp(&b.scale_id)
                .then(a.order.cmp(&b.order))
                .then(a.id.cmp(&b.id))
        });
        Ok(items)
    }

    fn active_items_in_scale(&self, scale_id: &str) -> Result<Vec<Item>> {
        let mut items: Vec<Item> = self
            .items
            .read()
            .values()
            .filter(|item| item.active && item.scale_id == scale_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.order.cmp(&b.order).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    fn insert_candidate(&self, candidate: Candidate) -> Result<()> {
        let mut candidates = self.candidates.write();
        if candidates.contains_key(&candidate.id) {
            return Err(duplicate("candidate", candidate.id));
        }
        candidates.insert(candidate.id, candidate);
        Ok(())
    }

    fn candidate(&self, id: Uuid) -> Result<Option<Candidate>> {
        Ok(self.candidates.read().get(&id).cloned())
    }

    fn insert_assessment(&self, assessment: Assessment) -> Result<()> {
        let mut assessments = self.assessments.write();
        if assessments.contains_key(&assessment.id) {
            return Err(duplicate("assessment", assessment.id));
        }
        assessments.insert(assessment.id, assessment);
        Ok(())
    }

    fn assessment(&self, id: Uuid) -> Result<Option<Assessment>> {
        Ok(self.assessments.read().get(&id).cloned())
    }

    fn update_assessment(&self, assessment: &Assessment) -> Result<()> {
        let mut assessments = self.assessments.write();
        if !assessments.contains_key(&assessment.id) {
            return Err(PrismError::not_found("assessment", assessment.id));
        }
        assessments.insert(assessment.id, assessment.clone());
        Ok(())
    }

    fn append_response(&self, response: Response) -> Result<()> {
        self.responses
            .write()
            .entry(response.assessment_id)
            .or_default()
            .push(response);
        Ok(())
    }

    fn responses_for(&self, assessment_id: Uuid) -> Result<Vec<Response>> {
        Ok(self
            .responses
            .read()
            .get(&assessment_id)
            .cloned()
            .unwrap_or_default())
    }

    fn insert_scores(&self, scores: &[ScaleScore]) -> Result<()> {
        if scores.is_empty() {
            return Ok(());
        }
        let assessment_id = scores[0].assessment_id;
        let mut table = self.scores.write();
        if table.contains_key(&assessment_id) {
            return Err(duplicate("score set for assessment", assessment_id));
        }
        table.insert(assessment_id, scores.to_vec());
        tracing::debug!(%assessment_id, rows = scores.len(), "score set persisted");
        Ok(())
    }

    fn scores_for(&self, assessment_id: Uuid) -> Result<Vec<ScaleScore>> {
        Ok(self
            .scores
            .read()
            .get(&assessment_id)
            .cloned()
            .unwrap_or_default())
    }

    fn insert_model(&self, model: PerformanceModel) -> Result<()> {
        let mut models = self.models.write();
        if models.contains_key(&model.id) {
            return Err(duplicate("model", model.id));
        }
        models.insert(model.id, model);
        Ok(())
    }

    fn model(&self, id: Uuid) -> Result<Option<PerformanceModel>> {
        Ok(self.models.read().get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::{AssessmentType, IrtParams, ResponseValue, ScaleKind};

    #[test]
    fn scales_are_seed_once() {
        let store = MemoryStore::new();
        let scale = Scale::new("assertiveness", "Assertiveness", Domain::Behavioral, ScaleKind::Trait);
        store.insert_scale(scale.clone()).unwrap();
        assert!(matches!(
            store.insert_scale(scale),
            Err(PrismError::Repository(_))
        ));
        assert!(store.scale("assertiveness").unwrap().is_some());
        assert!(store.scale("unknown").unwrap().is_none());
    }

    #[test]
    fn item_listing_is_ordered_and_filtered() {
        let store = MemoryStore::new();
        let third = Item::likert("b_scale", "third", 1);
        let first = Item::likert("a_scale", "first", 1);
        let second = Item::likert("a_scale", "second", 2);
        let mut inactive = Item::likert("a_scale", "inactive", 0);
        inactive.active = false;
        // Insert out of order
        for item in [&third, &second, &inactive, &first] {
            store.insert_item(item.clone()).unwrap();
        }

        let listed = store.active_items_in_domain(Domain::Behavioral).unwrap();
        let texts: Vec<&str> = listed.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);

        let in_scale = store.active_items_in_scale("a_scale").unwrap();
        assert_eq!(in_scale.len(), 2);
    }

    #[test]
    fn invalid_items_are_rejected_at_the_door() {
        let store = MemoryStore::new();
        let mut broken = Item::cognitive(
            "numerical_reasoning",
            "2+2?",
            vec!["4".into()],
            "4",
            IrtParams::default(),
            0,
        );
        broken.correct_answer = None;
        assert!(matches!(
            store.insert_item(broken),
            Err(PrismError::InputInvalid(_))
        ));
    }

    #[test]
    fn responses_preserve_append_order() {
        let store = MemoryStore::new();
        let assessment_id = Uuid::new_v4();
        for rating in 1..=5u8 {
            store
                .append_response(Response::new(
                    assessment_id,
                    Uuid::new_v4(),
                    ResponseValue::Likert(rating),
                ))
                .unwrap();
        }
        let responses = store.responses_for(assessment_id).unwrap();
        let ratings: Vec<u8> = responses.iter().filter_map(|r| r.value.as_likert()).collect();
        assert_eq!(ratings, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn score_sets_are_write_once() {
        let store = MemoryStore::new();
        let assessment_id = Uuid::new_v4();
        let scores = vec![ScaleScore::new(assessment_id, "assertiveness", 20.0, 6, 60.0, 5)];
        store.insert_scores(&scores).unwrap();
        assert!(store.insert_scores(&scores).is_err());
        assert_eq!(store.scores_for(assessment_id).unwrap(), scores);
    }

    #[test]
    fn assessment_update_requires_existence() {
        let store = MemoryStore::new();
        let assessment = Assessment::new(Uuid::new_v4(), AssessmentType::Full);
        assert!(matches!(
            store.update_assessment(&assessment),
            Err(PrismError::NotFound { .. })
        ));
        store.insert_assessment(assessment.clone()).unwrap();
        assert!(store.update_assessment(&assessment).is_ok());
    }
}
