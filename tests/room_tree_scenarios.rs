//! End-to-end scenarios over the room/folder/file tree.

use dataroom::{
    format_path, Database, EntryKind, FileRepository, FolderRepository, HierarchyEngine,
    MetadataRepository, NewFile, NewFolder, RoomRepository, SearchEngine,
};

async fn setup() -> Database {
    Database::open_in_memory().await.unwrap()
}

#[tokio::test]
async fn duplicate_folder_gets_suffix_and_survives_original_deletion() {
    let db = setup().await;
    let rooms = RoomRepository::new(db.pool());
    let folders = FolderRepository::new(db.pool());

    let room = rooms.create("R1").await.unwrap();

    let original = folders.create(&NewFolder::new("Docs", &room.id)).await.unwrap();
    let duplicate = folders.create(&NewFolder::new("Docs", &room.id)).await.unwrap();
    assert_eq!(original.name, "Docs");
    assert_eq!(duplicate.name, "Docs (1)");

    folders.delete(&original.id).await.unwrap();

    let remaining = folders.list_by_parent(None, &room.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    // The suffixed name sticks; deletion of the original does not rename it
    assert_eq!(remaining[0].name, "Docs (1)");
}

#[tokio::test]
async fn cascade_delete_empties_subtree_and_spares_the_rest() {
    let db = setup().await;
    let rooms = RoomRepository::new(db.pool());
    let folders = FolderRepository::new(db.pool());
    let files = FileRepository::new(db.pool());

    let room = rooms.create("Deal").await.unwrap();

    // Chain of depth 5 under the doomed root, with files at levels 2 and 5
    let mut chain = Vec::new();
    let mut parent: Option<String> = None;
    for level in 1..=5 {
        let mut new = NewFolder::new(format!("L{level}"), &room.id);
        if let Some(ref p) = parent {
            new = new.with_parent(p);
        }
        let folder = folders.create(&new).await.unwrap();
        parent = Some(folder.id.clone());
        chain.push(folder);
    }
    for level in [2usize, 5] {
        files
            .create(
                &NewFile::new("buried.txt", &room.id, "text/plain", b"x".to_vec())
                    .with_folder(&chain[level - 1].id),
            )
            .await
            .unwrap();
    }

    // A sibling tree that must survive
    let sibling = folders.create(&NewFolder::new("Keep", &room.id)).await.unwrap();
    files
        .create(
            &NewFile::new("keep.txt", &room.id, "text/plain", b"y".to_vec())
                .with_folder(&sibling.id),
        )
        .await
        .unwrap();

    folders.delete(&chain[0].id).await.unwrap();

    let surviving_folders = folders.list_by_room(&room.id).await.unwrap();
    assert_eq!(surviving_folders.len(), 1);
    assert_eq!(surviving_folders[0].name, "Keep");

    let surviving_files = files.list_by_room(&room.id).await.unwrap();
    assert_eq!(surviving_files.len(), 1);
    assert_eq!(surviving_files[0].name, "keep.txt");
}

#[tokio::test]
async fn cascade_delete_handles_deep_nesting() {
    let db = setup().await;
    let rooms = RoomRepository::new(db.pool());
    let folders = FolderRepository::new(db.pool());

    let room = rooms.create("Deep").await.unwrap();

    let mut parent: Option<String> = None;
    let mut root_id = None;
    for level in 0..120 {
        let mut new = NewFolder::new(format!("d{level}"), &room.id);
        if let Some(ref p) = parent {
            new = new.with_parent(p);
        }
        let folder = folders.create(&new).await.unwrap();
        if root_id.is_none() {
            root_id = Some(folder.id.clone());
        }
        parent = Some(folder.id);
    }

    folders.delete(&root_id.unwrap()).await.unwrap();
    assert!(folders.list_by_room(&room.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn room_deletion_removes_everything_it_owns() {
    let db = setup().await;
    let rooms = RoomRepository::new(db.pool());
    let folders = FolderRepository::new(db.pool());
    let files = FileRepository::new(db.pool());

    let doomed = rooms.create("Doomed").await.unwrap();
    let safe = rooms.create("Safe").await.unwrap();

    let folder = folders.create(&NewFolder::new("Docs", &doomed.id)).await.unwrap();
    files
        .create(
            &NewFile::new("a.txt", &doomed.id, "text/plain", b"a".to_vec())
                .with_folder(&folder.id),
        )
        .await
        .unwrap();
    files
        .create(&NewFile::new("b.txt", &safe.id, "text/plain", b"b".to_vec()))
        .await
        .unwrap();

    rooms.delete(&doomed.id).await.unwrap();

    assert!(rooms.get_by_id(&doomed.id).await.unwrap().is_none());
    assert!(folders.list_by_room(&doomed.id).await.unwrap().is_empty());
    assert!(files.list_by_room(&doomed.id).await.unwrap().is_empty());

    // The other room is untouched
    assert!(rooms.get_by_id(&safe.id).await.unwrap().is_some());
    assert_eq!(files.list_by_room(&safe.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn full_path_for_nested_file() {
    let db = setup().await;
    let rooms = RoomRepository::new(db.pool());
    let folders = FolderRepository::new(db.pool());
    let files = FileRepository::new(db.pool());
    let engine = HierarchyEngine::new(db.pool());

    let room = rooms.create("Acme").await.unwrap();
    let a = folders.create(&NewFolder::new("A", &room.id)).await.unwrap();
    let b = folders
        .create(&NewFolder::new("B", &room.id).with_parent(&a.id))
        .await
        .unwrap();
    let c = folders
        .create(&NewFolder::new("C", &room.id).with_parent(&b.id))
        .await
        .unwrap();
    let doc = files
        .create(
            &NewFile::new("doc.txt", &room.id, "text/plain", b"hello".to_vec())
                .with_folder(&c.id),
        )
        .await
        .unwrap();

    let path = engine
        .full_path(doc.folder_id.as_deref(), Some(&doc.name), &room.name)
        .await
        .unwrap();
    assert_eq!(path, "Acme / A / B / C / doc.txt");
}

#[tokio::test]
async fn aggregate_room_root_counts_direct_children() {
    let db = setup().await;
    let rooms = RoomRepository::new(db.pool());
    let files = FileRepository::new(db.pool());
    let engine = HierarchyEngine::new(db.pool());

    let room = rooms.create("Stats").await.unwrap();
    files
        .create(&NewFile::new("a.txt", &room.id, "text/plain", vec![0u8; 100]))
        .await
        .unwrap();

    let stats = engine.aggregate(None, &room.id).await.unwrap();
    assert_eq!(stats.file_count, 1);
    assert_eq!(stats.folder_count, 0);
    assert_eq!(stats.total_bytes, 100);
}

#[tokio::test]
async fn batch_uploads_with_same_name_all_get_distinct_names() {
    let db = setup().await;
    let rooms = RoomRepository::new(db.pool());
    let files = FileRepository::new(db.pool());

    let room = rooms.create("Batch").await.unwrap();

    // Each create re-reads the sibling scope, so a sequential batch of the
    // same candidate yields the counter series
    for _ in 0..3 {
        files
            .create(&NewFile::new("drop.txt", &room.id, "text/plain", vec![1]))
            .await
            .unwrap();
    }

    let mut names: Vec<String> = files
        .list_by_room(&room.id)
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.name)
        .collect();
    names.sort();
    assert_eq!(names, ["drop (1).txt", "drop (2).txt", "drop.txt"]);
}

#[tokio::test]
async fn search_finds_folders_and_files_with_paths() {
    let db = setup().await;
    let rooms = RoomRepository::new(db.pool());
    let folders = FolderRepository::new(db.pool());
    let files = FileRepository::new(db.pool());
    let engine = SearchEngine::new(db.pool());

    let room = rooms.create("Acme").await.unwrap();
    let documents = folders
        .create(&NewFolder::new("Documents", &room.id))
        .await
        .unwrap();
    files
        .create(
            &NewFile::new("report.doc.docx", &room.id, String::new(), vec![1])
                .with_folder(&documents.id),
        )
        .await
        .unwrap();

    let results = engine.search("doc", &room.id).await.unwrap();
    assert_eq!(results.len(), 2);

    assert_eq!(results[0].kind, EntryKind::Folder);
    assert_eq!(results[0].name, "Documents");
    assert_eq!(format_path(&results[0].path, &room.name), "Acme / Documents");

    assert_eq!(results[1].kind, EntryKind::File);
    assert_eq!(format_path(&results[1].path, &room.name), "Acme / Documents");
}

#[tokio::test]
async fn metadata_seed_flag_round_trip() {
    let db = setup().await;
    let metadata = MetadataRepository::new(db.pool());

    assert_eq!(metadata.get("mocks_loaded").await.unwrap(), None);
    metadata.set("mocks_loaded", "true").await.unwrap();
    assert_eq!(
        metadata.get("mocks_loaded").await.unwrap(),
        Some("true".to_string())
    );
}
