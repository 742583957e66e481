//! Course materials.
//!
//! File metadata is taken as declared: a `size` field overrides the number
//! of bytes received, and `fileType` is not checked against the content.

use chrono::Utc;
use lms_core::{CourseId, MaterialId};
use lms_store::{FileType, Material, Store};

use crate::assignments::author;
use crate::enrollments::enrolled_course_ids;
use crate::error::{or_missing, LmsError, Result};
use crate::types::{Caller, MaterialPatch, Upload};

/// List materials, optionally for one course.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn list<S: Store>(store: &S, course: Option<&CourseId>) -> Result<Vec<Material>> {
    let mut materials = store.list_materials()?;
    if let Some(course) = course {
        materials.retain(|m| &m.course.id == course);
    }
    Ok(materials)
}

/// Materials in the courses the caller is enrolled in.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn enrolled<S: Store>(store: &S, caller: &Caller) -> Result<Vec<Material>> {
    let courses = enrolled_course_ids(store, &caller.user_id)?;
    let mut materials = store.list_materials()?;
    materials.retain(|m| courses.contains(&m.course.id));
    Ok(materials)
}

/// Create a material from an upload.
///
/// # Errors
///
/// Returns `LmsError::Validation` for a missing `title`, `course` or `file`,
/// or a malformed `size`/`fileType`, and `LmsError::CourseNotFound` if the
/// course does not resolve.
pub fn create<S: Store>(store: &S, caller: &Caller, upload: &Upload) -> Result<Material> {
    let title = upload.require("title")?.to_string();
    let course_id = CourseId::new(
        upload
            .get_any(&["course", "courseId"])
            .ok_or_else(|| LmsError::validation("course is required"))?,
    )?;
    let file = upload
        .file
        .as_ref()
        .ok_or_else(|| LmsError::validation("No file uploaded"))?;
    let declared_size = upload.parse::<u64>("size")?;
    let file_type = upload
        .parse_enum::<FileType>("fileType")?
        .unwrap_or_default();

    let course = store
        .get_course(&course_id)?
        .ok_or(LmsError::CourseNotFound)?;

    let mut meta = file.meta("materials");
    if let Some(size) = declared_size {
        meta.size = size;
    }
    if let Some(original_name) = upload.get("originalName") {
        meta.original_name = original_name.to_string();
    }

    let now = Utc::now();
    let material = Material {
        id: MaterialId::generate(),
        title,
        description: upload.get("description").unwrap_or_default().to_string(),
        file_type,
        course: course.summary(),
        file: meta,
        uploaded_by: author(store, &caller.user_id)?,
        created_at: now,
        updated_at: now,
    };
    store.insert_material(&material)?;

    tracing::info!(
        material_id = %material.id,
        course_id = %course.id,
        size = material.file.size,
        "Uploaded material"
    );
    Ok(material)
}

/// Merge a patch into a material.
///
/// # Errors
///
/// Returns `LmsError::MaterialNotFound` if the material does not exist.
pub fn update<S: Store>(store: &S, material_id: &MaterialId, patch: MaterialPatch) -> Result<Material> {
    let mut material = store
        .get_material(material_id)?
        .ok_or(LmsError::MaterialNotFound)?;

    if let Some(title) = patch.title {
        material.title = title;
    }
    if let Some(description) = patch.description {
        material.description = description;
    }
    if let Some(file_type) = patch.file_type {
        material.file_type = file_type;
    }
    material.updated_at = Utc::now();

    store
        .put_material(&material)
        .map_err(|e| or_missing(e, LmsError::MaterialNotFound))?;
    Ok(material)
}

/// Delete a material.
///
/// # Errors
///
/// Returns `LmsError::MaterialNotFound` if the material does not exist.
pub fn delete<S: Store>(store: &S, material_id: &MaterialId) -> Result<()> {
    store
        .delete_material(material_id)
        .map_err(|e| or_missing(e, LmsError::MaterialNotFound))?;
    tracing::info!(material_id = %material_id, "Deleted material");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FilePart;
    use lms_core::{Role, UserId};
    use lms_store::MemoryStore;

    fn caller(id: &str, role: Role) -> Caller {
        Caller::new(UserId::new(id).unwrap(), role)
    }

    fn slides() -> FilePart {
        FilePart {
            file_name: "week1.pptx".to_string(),
            content_type: None,
            bytes: vec![1, 2, 3, 4],
        }
    }

    #[test]
    fn create_takes_declared_metadata() {
        let store = MemoryStore::with_demo_data();
        let upload = Upload::default()
            .field("title", "Week 1 slides")
            .field("courseId", "course1")
            .field("size", "2048")
            .field("originalName", "Week 1.pptx")
            .with_file(slides());

        let material = create(&store, &caller("instructor1", Role::Instructor), &upload).unwrap();
        assert_eq!(material.file.size, 2048);
        assert_eq!(material.file.original_name, "Week 1.pptx");
        assert_eq!(material.file_type, FileType::Other);
        assert_eq!(material.uploaded_by.first_name, "Dr. Sarah");
        assert_eq!(material.course.code, "CS101");
    }

    #[test]
    fn create_falls_back_to_received_file() {
        let store = MemoryStore::with_demo_data();
        let upload = Upload::default()
            .field("title", "Week 1 slides")
            .field("course", "course1")
            .field("fileType", "document")
            .with_file(slides());

        let material = create(&store, &caller("admin1", Role::Admin), &upload).unwrap();
        assert_eq!(material.file.size, 4);
        assert_eq!(material.file.original_name, "week1.pptx");
        assert_eq!(material.file_type, FileType::Document);
    }

    #[test]
    fn create_validates() {
        let store = MemoryStore::with_demo_data();
        let sarah = caller("instructor1", Role::Instructor);
        let no_file = Upload::default().field("title", "x").field("course", "course1");
        assert!(matches!(create(&store, &sarah, &no_file), Err(LmsError::Validation(_))));

        let bad_size = no_file.clone().field("size", "-1").with_file(slides());
        assert!(matches!(create(&store, &sarah, &bad_size), Err(LmsError::Validation(_))));

        let ghost = no_file.field("course", "ghost").with_file(slides());
        assert!(matches!(create(&store, &sarah, &ghost), Err(LmsError::CourseNotFound)));
    }

    #[test]
    fn enrolled_joins_through_enrollments() {
        let store = MemoryStore::with_demo_data();
        // Jane is enrolled in CS101 and WEB101.
        let mine = enrolled(&store, &caller("student2", Role::Student)).unwrap();
        let ids: Vec<_> = mine.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["material1", "material3"]);
    }

    #[test]
    fn update_and_delete() {
        let store = MemoryStore::with_demo_data();
        let id = MaterialId::new("material2").unwrap();
        let updated = update(
            &store,
            &id,
            MaterialPatch {
                title: Some("DS Overview (2024)".into()),
                ..MaterialPatch::default()
            },
        )
        .unwrap();
        assert_eq!(updated.title, "DS Overview (2024)");
        assert_eq!(updated.file_type, FileType::Video);

        delete(&store, &id).unwrap();
        assert_eq!(list(&store, None).unwrap().len(), 3);
        assert!(matches!(delete(&store, &id), Err(LmsError::MaterialNotFound)));
    }
}
