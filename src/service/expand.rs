//! Field expansion: materialize the resources behind `Expandable` references.

use crate::entity::{Entity, Expandable};
use crate::error::AppError;
use crate::store::Fetchable;
use std::collections::HashMap;
use uuid::Uuid;

/// Fetch the referenced resource. A null id is left alone; an id that does not resolve for
/// the tenant is a NotFound naming the related resource.
pub async fn expand_one<T, F>(field: &mut Expandable<T>, tenant: Uuid, fetcher: &F) -> Result<(), AppError>
where
    T: Entity,
    F: Fetchable<T> + ?Sized,
{
    let Some(id) = field.id else {
        return Ok(());
    };
    tracing::debug!(resource = T::NAME, id = %id, "expanding");
    let resource = fetcher.get(id, tenant).await?;
    field.resource = Some(Box::new(resource));
    Ok(())
}

/// Fill every reference from one batched fetch over the distinct ids. Ids missing from the
/// batch result stay collapsed.
pub async fn expand_many<T, F>(refs: Vec<&mut Expandable<T>>, tenant: Uuid, fetcher: &F) -> Result<(), AppError>
where
    T: Entity,
    F: Fetchable<T> + ?Sized,
{
    let mut ids: Vec<Uuid> = Vec::new();
    for id in refs.iter().filter_map(|r| r.id) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    if ids.is_empty() {
        return Ok(());
    }
    tracing::debug!(resource = T::NAME, count = ids.len(), "batch expanding");
    let found: HashMap<Uuid, T> = fetcher
        .list_by_ids(&ids, tenant)
        .await?
        .into_iter()
        .filter_map(|r| r.id().map(|id| (id, r)))
        .collect();
    for r in refs {
        if let Some(resource) = r.id.and_then(|id| found.get(&id)) {
            r.resource = Some(Box::new(resource.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Group;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves a fixed set of groups and records every call.
    #[derive(Default)]
    struct CountingFetcher {
        groups: Vec<Group>,
        gets: Mutex<Vec<Uuid>>,
        batches: Mutex<Vec<Vec<Uuid>>>,
    }

    impl CountingFetcher {
        fn with(ids: &[Uuid]) -> Self {
            let groups = ids
                .iter()
                .map(|id| {
                    let mut g = Group::default();
                    g.base.id = Some(*id);
                    g.name = format!("group {}", id);
                    g
                })
                .collect();
            CountingFetcher {
                groups,
                ..CountingFetcher::default()
            }
        }
    }

    #[async_trait]
    impl Fetchable<Group> for CountingFetcher {
        async fn get(&self, id: Uuid, _tenant: Uuid) -> Result<Group, AppError> {
            self.gets.lock().unwrap().push(id);
            self.groups
                .iter()
                .find(|g| g.base.id == Some(id))
                .cloned()
                .ok_or_else(|| AppError::not_found("group", id))
        }

        async fn list_by_ids(&self, ids: &[Uuid], _tenant: Uuid) -> Result<Vec<Group>, AppError> {
            self.batches.lock().unwrap().push(ids.to_vec());
            Ok(self
                .groups
                .iter()
                .filter(|g| g.base.id.map_or(false, |id| ids.contains(&id)))
                .cloned()
                .collect())
        }
    }

    #[tokio::test]
    async fn null_id_never_fetches() {
        let fetcher = CountingFetcher::default();
        let mut field = Expandable::<Group>::default();
        expand_one(&mut field, Uuid::new_v4(), &fetcher).await.unwrap();
        assert!(!field.is_expanded());
        assert!(fetcher.gets.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn single_miss_is_not_found() {
        let fetcher = CountingFetcher::default();
        let id = Uuid::new_v4();
        let mut field = Expandable::<Group>::new(Some(id));
        let err = expand_one(&mut field, Uuid::new_v4(), &fetcher).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { resource: "group", id: e } if e == id));
    }

    #[tokio::test]
    async fn duplicates_collapse_into_one_batch() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let fetcher = CountingFetcher::with(&[a, b]);
        let mut fields = vec![
            Expandable::<Group>::new(Some(a)),
            Expandable::new(Some(b)),
            Expandable::new(Some(a)),
            Expandable::new(None),
        ];
        expand_many(fields.iter_mut().collect(), Uuid::new_v4(), &fetcher)
            .await
            .unwrap();
        let batches = fetcher.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0], vec![a, b]);
        assert!(fields[0].is_expanded() && fields[1].is_expanded() && fields[2].is_expanded());
        assert!(!fields[3].is_expanded());
        assert_eq!(fields[2].resource.as_ref().unwrap().base.id, Some(a));
    }

    #[tokio::test]
    async fn batch_miss_is_silent() {
        let known = Uuid::new_v4();
        let fetcher = CountingFetcher::with(&[known]);
        let mut fields = vec![Expandable::<Group>::new(Some(known)), Expandable::new(Some(Uuid::new_v4()))];
        expand_many(fields.iter_mut().collect(), Uuid::new_v4(), &fetcher)
            .await
            .unwrap();
        assert!(fields[0].is_expanded());
        assert!(!fields[1].is_expanded());
    }

    #[tokio::test]
    async fn all_null_skips_batch() {
        let fetcher = CountingFetcher::default();
        let mut fields = vec![Expandable::<Group>::new(None)];
        expand_many(fields.iter_mut().collect(), Uuid::new_v4(), &fetcher)
            .await
            .unwrap();
        assert!(fetcher.batches.lock().unwrap().is_empty());
    }
}
