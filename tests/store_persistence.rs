mod common;

#[cfg(test)]
mod tests {
    use crate::common::{memory_store, Call, FakeBackend};
    use docchat::db::service::DbService;
    use docchat::store::models::{Message, Origin, RemoteSessionId, Thread, ThreadPatch, DEFAULT_THREAD_LABEL};
    use docchat::store::persist::{self, STORAGE_KEY};
    use docchat::store::SessionStore;

    fn stored_threads(pool: &docchat::db::DbPool) -> Vec<Thread> {
        let conn = pool.lock().unwrap();
        persist::load_threads(&conn).unwrap()
    }

    #[tokio::test]
    async fn test_append_persists_after_every_call() {
        let (pool, store) = memory_store();
        let backend = FakeBackend::new();
        let id = store.create_thread(&backend).await.unwrap();

        let messages = [
            Message::user("What is in the report?"),
            Message::assistant("\n\nThree sections."),
            Message::error("rate limited"),
            Message::user("Thanks"),
        ];

        for message in messages {
            let snapshot = store.append(id, message).unwrap();
            assert_eq!(stored_threads(&pool), snapshot.threads);
        }

        // Reload from the same storage
        let reloaded = SessionStore::load(pool.clone()).unwrap();
        assert_eq!(reloaded.snapshot().threads, store.snapshot().threads);
        assert_eq!(reloaded.snapshot().threads[0].messages.len(), 4);
    }

    #[tokio::test]
    async fn test_clear_all_removes_storage_key() {
        let (pool, store) = memory_store();
        let backend = FakeBackend::new();
        let id = store.create_thread(&backend).await.unwrap();
        store.append(id, Message::user("hi")).unwrap();

        let snapshot = store.clear_all().unwrap();
        assert!(snapshot.threads.is_empty());
        assert!(snapshot.selected.is_none());

        let conn = pool.lock().unwrap();
        assert!(DbService::get_item(&conn, STORAGE_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_thread_is_ignored() {
        let (pool, store) = memory_store();
        let before = store.snapshot();

        let after = store.append(uuid::Uuid::new_v4(), Message::user("lost")).unwrap();
        assert_eq!(*before, *after);

        let after = store
            .update(uuid::Uuid::new_v4(), ThreadPatch::label("nope"))
            .unwrap();
        assert_eq!(*before, *after);

        let conn = pool.lock().unwrap();
        assert!(DbService::get_item(&conn, STORAGE_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remote_session_is_never_reassigned() {
        let (pool, store) = memory_store();
        let backend = FakeBackend::new();
        let id = store.create_thread(&backend).await.unwrap();
        let original = store.snapshot().thread(id).unwrap().remote_session_id.clone();
        assert_eq!(original, Some(RemoteSessionId::new("session-1")));

        store
            .update(id, ThreadPatch::remote_session_id(RemoteSessionId::new("other")))
            .unwrap();
        assert_eq!(store.snapshot().thread(id).unwrap().remote_session_id, original);

        store.update(id, ThreadPatch::label("Quarterly numbers")).unwrap();
        let stored = stored_threads(&pool);
        assert_eq!(stored[0].label, "Quarterly numbers");
        assert_eq!(stored[0].remote_session_id, original);
    }

    #[tokio::test]
    async fn test_first_user_message_becomes_label() {
        let (_pool, store) = memory_store();
        let backend = FakeBackend::new();
        let id = store.create_thread(&backend).await.unwrap();
        assert_eq!(store.snapshot().thread(id).unwrap().label, DEFAULT_THREAD_LABEL);

        store.append(id, Message::assistant("Uploaded 1 document(s): a.pdf")).unwrap();
        assert_eq!(store.snapshot().thread(id).unwrap().label, DEFAULT_THREAD_LABEL);

        store.append(id, Message::user("Summarize a.pdf")).unwrap();
        store.append(id, Message::user("And the appendix?")).unwrap();
        assert_eq!(store.snapshot().thread(id).unwrap().label, "Summarize a.pdf");
    }

    #[tokio::test]
    async fn test_create_thread_reuses_empty_thread() {
        let (_pool, store) = memory_store();
        let backend = FakeBackend::new();

        let first = store.create_thread(&backend).await.unwrap();
        let second = store.create_thread(&backend).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.snapshot().threads.len(), 1);
        assert_eq!(backend.count(|c| *c == Call::CreateSession), 1);

        store.append(first, Message::user("hello")).unwrap();
        let third = store.create_thread(&backend).await.unwrap();
        assert_ne!(first, third);
        assert_eq!(store.snapshot().selected, Some(third));
        assert_eq!(backend.count(|c| *c == Call::CreateSession), 2);
    }

    #[tokio::test]
    async fn test_create_thread_failure_leaves_store_untouched() {
        let (pool, store) = memory_store();
        let backend = FakeBackend::new().with_failing_sessions();

        assert!(store.create_thread(&backend).await.is_err());
        assert!(store.snapshot().threads.is_empty());

        let conn = pool.lock().unwrap();
        assert!(DbService::get_item(&conn, STORAGE_KEY).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_and_select() {
        let (pool, store) = memory_store();
        let backend = FakeBackend::new();

        let a = store.create_thread(&backend).await.unwrap();
        store.append(a, Message::user("first")).unwrap();
        let b = store.create_thread(&backend).await.unwrap();
        store.append(b, Message::user("second")).unwrap();

        assert_eq!(store.select(a).unwrap().selected, Some(a));
        assert_eq!(store.select(uuid::Uuid::new_v4()).unwrap().selected, None);

        store.select(b).unwrap();
        let snapshot = store.remove(b).unwrap();
        assert_eq!(snapshot.threads.len(), 1);
        assert_eq!(snapshot.selected, None);
        assert_eq!(stored_threads(&pool), snapshot.threads);
    }

    #[test]
    fn test_load_selects_first_thread_and_tolerates_garbage() {
        let pool = docchat::db::in_memory().unwrap();
        {
            let conn = pool.lock().unwrap();
            DbService::set_item(&conn, STORAGE_KEY, "not json").unwrap();
        }
        let store = SessionStore::load(pool.clone()).unwrap();
        assert!(store.snapshot().threads.is_empty());

        let threads = vec![
            Thread::new(Some(RemoteSessionId::new("s-1"))),
            Thread::new(None),
        ];
        {
            let conn = pool.lock().unwrap();
            persist::save_threads(&conn, &threads).unwrap();
        }
        let store = SessionStore::load(pool).unwrap();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.threads, threads);
        assert_eq!(snapshot.selected, Some(threads[0].id));
    }

    #[test]
    fn test_persisted_layout() {
        let mut thread = Thread::new(Some(RemoteSessionId::new("abc")));
        thread.messages.push(Message::user("hi"));
        let json = serde_json::to_value(vec![thread]).unwrap();

        assert_eq!(json[0]["remoteSessionId"], "abc");
        assert_eq!(json[0]["label"], "New chat");
        assert_eq!(json[0]["messages"][0]["origin"], "user");
        assert_eq!(json[0]["messages"][0]["text"], "hi");
        assert_eq!(
            serde_json::from_value::<Origin>(serde_json::json!("error")).unwrap(),
            Origin::Error
        );
    }
}
