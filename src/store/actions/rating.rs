use tracing::info;

use super::RATINGS_COLLECTION;
use crate::backend::{BackendError, BackendPath};
use crate::models::{NewRating, Rating};
use crate::store::saga::{ActionError, ActionKind, Step, StepLog};
use crate::store::{Mutation, Store};

impl Store {
    /// Push a rating under `<classname>/rating` and append it locally with the assigned key.
    pub async fn add_rating(&self, rating: NewRating) -> Result<Rating, ActionError> {
        let kind = ActionKind::AddRating;
        let id = self.begin(kind, Some(&rating.classname)).await;

        match self.push_rating(&rating).await {
            Ok(created) => {
                self.commit(Mutation::AddRating(created.clone())).await;
                self.finish(id, kind, Ok(())).await;
                info!("Added rating {} to {}", created.id, created.classname);
                Ok(created)
            }
            Err(err) => {
                self.finish(id, kind, Err(&err)).await;
                Err(err)
            }
        }
    }

    async fn push_rating(&self, rating: &NewRating) -> Result<Rating, ActionError> {
        let kind = ActionKind::AddRating;
        let collection = BackendPath::new(&rating.classname).child(RATINGS_COLLECTION);
        let record = rating.to_record();
        let body = serde_json::to_value(&record)
            .map_err(|e| ActionError::new(kind, Step::PushRecord, BackendError::from(e)))?;

        let mut steps = StepLog::new(kind);
        let key = steps.run(Step::PushRecord, self.backend().database.push(&collection, body).await)?;
        Ok(record.into_rating(key))
    }
}
