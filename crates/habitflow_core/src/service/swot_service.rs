//! SWOT analysis use-case service.

use crate::model::fields;
use crate::model::swot::{NewSwotAnalysis, SwotAnalysis, SwotId, SwotPatch};
use crate::service::{ServiceError, ServiceResult};
use crate::store::codec::{decode, decode_all, encode};
use crate::store::{Collection, Direction, DocumentPatch, DocumentStore, Query};

/// SWOT analysis service facade over a document store.
pub struct SwotService<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> SwotService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn create_swot_analysis(
        &self,
        user_id: &str,
        analysis: &NewSwotAnalysis,
    ) -> ServiceResult<SwotId> {
        analysis.validate()?;
        let patch = DocumentPatch::from_fields(encode(analysis)?)
            .set(fields::USER_ID, user_id)
            .server_timestamp(fields::CREATED_AT)
            .server_timestamp(fields::UPDATED_AT);
        Ok(self.store.add(Collection::SwotAnalyses, &patch)?)
    }

    /// Lists the owner's analyses, newest first, optionally for one goal.
    pub fn fetch_swot_analyses(
        &self,
        user_id: &str,
        goal_id: Option<&str>,
    ) -> ServiceResult<Vec<SwotAnalysis>> {
        let mut query = Query::new().where_eq(fields::USER_ID, user_id);
        if let Some(goal_id) = goal_id {
            query = query.where_eq(fields::GOAL_ID, goal_id);
        }
        let query = query.order_by(fields::CREATED_AT, Direction::Desc);
        Ok(decode_all(self.store.query(Collection::SwotAnalyses, &query)?)?)
    }

    /// Applies a partial update and restamps `updatedAt`.
    ///
    /// When quadrants change, the stored analysis is read so the update
    /// cannot leave all four blank.
    pub fn update_swot_analysis(&self, swot_id: &str, patch: &SwotPatch) -> ServiceResult<()> {
        if patch.touches_quadrants() {
            let stored = self
                .store
                .get(Collection::SwotAnalyses, swot_id)?
                .map(decode::<SwotAnalysis>)
                .transpose()?
                .ok_or_else(|| ServiceError::NotFound {
                    collection: Collection::SwotAnalyses,
                    id: swot_id.to_string(),
                })?;
            patch.validate_against(&stored)?;
        }
        let patch = patch
            .to_document_patch()
            .server_timestamp(fields::UPDATED_AT);
        Ok(self.store.update(Collection::SwotAnalyses, swot_id, &patch)?)
    }

    pub fn delete_swot_analysis(&self, swot_id: &str) -> ServiceResult<()> {
        Ok(self.store.delete(Collection::SwotAnalyses, swot_id)?)
    }
}
