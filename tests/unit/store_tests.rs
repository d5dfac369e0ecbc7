/*!
 * Tests for the content store through its public API
 */

use anyhow::Result;
use loctrans::database::ContentStore;
use loctrans::StoreError;
use crate::common;

/// Concurrent inserts of the same id must produce exactly one record
#[tokio::test]
async fn test_insertIfNew_fromManyTasks_shouldInsertExactlyOnce() -> Result<()> {
    let store = ContentStore::in_memory()?;
    let id = common::uid(1);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let store = store.clone();
            let id = id.clone();
            tokio::spawn(async move { store.insert_if_new(&id, &format!("text {}", i)).await })
        })
        .collect();

    let mut inserted = 0;
    for handle in handles {
        if handle.await?? {
            inserted += 1;
        }
    }

    assert_eq!(inserted, 1);
    assert_eq!(store.stats().await?.total, 1);
    Ok(())
}

/// Records written through one handle are visible after reopening the file
#[tokio::test]
async fn test_open_afterWrites_shouldPersistBothStates() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let db_path = temp_dir.path().join("nested").join("translations.db");

    {
        let store = ContentStore::open(&db_path)?;
        store.insert_if_new(&common::uid(1), "Hello").await?;
        store.insert_if_new(&common::uid(2), "World").await?;
        store.set_translation(&common::uid(1), "你好").await?;
    }

    let store = ContentStore::open(&db_path)?;
    let stats = store.stats().await?;

    assert_eq!((stats.total, stats.pending, stats.complete), (2, 1, 1));
    assert_eq!(store.list_pending().await?, vec![(common::uid(2), "World".to_string())]);
    assert_eq!(store.path(), db_path.as_path());
    Ok(())
}

/// set_translation on an unknown id is an error the caller can match on
#[tokio::test]
async fn test_setTranslation_withUnknownId_shouldDowncastToNotFound() -> Result<()> {
    let store = ContentStore::in_memory()?;

    let err = store.set_translation(&common::uid(9), "x").await.unwrap_err();

    assert!(matches!(err.downcast_ref::<StoreError>(), Some(StoreError::NotFound(_))));
    Ok(())
}

/// get returns both the source and the translation
#[tokio::test]
async fn test_get_shouldReturnFullRecord() -> Result<()> {
    let store = ContentStore::in_memory()?;
    store.insert_if_new(&common::uid(3), "Sword").await?;

    let pending = store.get(&common::uid(3)).await?.unwrap();
    assert!(pending.is_pending());

    store.set_translation(&common::uid(3), "剑").await?;
    let complete = store.get(&common::uid(3)).await?.unwrap();

    assert_eq!(complete.source_text, "Sword");
    assert_eq!(complete.translated_text.as_deref(), Some("剑"));
    assert!(store.get(&common::uid(4)).await?.is_none());
    Ok(())
}

/// An empty store reports zero counts
#[test]
fn test_stats_onEmptyStore_shouldBeZero() -> Result<()> {
    let store = ContentStore::in_memory()?;

    let stats = tokio_test::block_on(store.stats())?;

    assert_eq!((stats.total, stats.pending, stats.complete), (0, 0, 0));
    assert!(tokio_test::block_on(store.list_complete())?.is_empty());
    Ok(())
}
