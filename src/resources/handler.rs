//! Create/read/update/delete/import of configuration objects.
//!
//! Every live operation opens one [`JunosSession`] and closes it on every
//! path. Write operations lock the candidate configuration; any failure
//! while the lock is held triggers exactly one [`Session::config_clear`]
//! whose own failures are reported as warnings ahead of the original error.

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::junos::{JunosSession, Session};

use super::diag::Diagnostics;
use super::object::{
    delete_lines, fill_state, from_state, has_config, parse_relative, set_lines, show_command,
    ConfigObject,
};
use super::state::ResourceData;

/// Whether the object called `name` exists on the device
pub async fn exists<T: ConfigObject>(
    name: &str,
    sess: &Session,
    junos: &JunosSession,
) -> Result<bool> {
    let output = sess.command(&show_command::<T>(name, false), junos).await?;
    Ok(has_config(&output))
}

/// Read the object called `name`; an empty name in the result means absent
pub async fn read_object<T: ConfigObject>(
    name: &str,
    sess: &Session,
    junos: &JunosSession,
) -> Result<T> {
    let output = sess.command(&show_command::<T>(name, true), junos).await?;
    parse_relative(name, &output)
}

async fn set_object<T: ConfigObject>(
    obj: &T,
    sess: &Session,
    junos: Option<&JunosSession>,
) -> Result<()> {
    sess.config_set(&set_lines(obj), junos).await
}

async fn delete_object<T: ConfigObject>(
    obj: &T,
    sess: &Session,
    junos: Option<&JunosSession>,
) -> Result<()> {
    sess.config_set(&delete_lines(obj), junos).await
}

/// Roll back the candidate once, then report `err` after any rollback warnings
async fn abort(
    sess: &Session,
    junos: &JunosSession,
    mut diags: Diagnostics,
    err: Error,
) -> Diagnostics {
    diags.append_warns(sess.config_clear(junos).await);
    diags.push_err(err);
    diags
}

fn commit_message<T: ConfigObject>(action: &str) -> String {
    format!("{} resource {}", action, T::RESOURCE_TYPE)
}

// ============================================================================
// Create
// ============================================================================

/// Create the object described by `data` and refresh `data` from the device
pub async fn create<T: ConfigObject>(sess: &Session, data: &mut ResourceData) -> Diagnostics {
    let obj: T = match from_state(data) {
        Ok(obj) => obj,
        Err(e) => return Diagnostics::from_err(e),
    };

    if sess.fake_create_setfile().is_some() {
        if let Err(e) = set_object(&obj, sess, None).await {
            return Diagnostics::from_err(e);
        }
        data.set_id(obj.name());
        return Diagnostics::new();
    }

    let junos = match sess.start_new_session().await {
        Ok(junos) => junos,
        Err(e) => return Diagnostics::from_err(e),
    };
    let diags = create_with_session(&obj, sess, &junos, data).await;
    sess.close_session(junos).await;
    diags
}

async fn create_with_session<T: ConfigObject>(
    obj: &T,
    sess: &Session,
    junos: &JunosSession,
    data: &mut ResourceData,
) -> Diagnostics {
    if !T::check_compatibility(&junos.system_information) {
        return Diagnostics::from_err(Error::Incompatible {
            feature: T::DESCRIPTION,
            model: junos.system_information.hardware_model.clone(),
        });
    }
    if let Err(e) = sess.config_lock(junos).await {
        return Diagnostics::from_err(e);
    }

    let mut diags = Diagnostics::new();
    match exists::<T>(obj.name(), sess, junos).await {
        Ok(false) => {}
        Ok(true) => {
            let err = Error::AlreadyExists {
                description: T::DESCRIPTION,
                name: obj.name().to_string(),
            };
            return abort(sess, junos, diags, err).await;
        }
        Err(e) => return abort(sess, junos, diags, e).await,
    }
    if let Err(e) = set_object(obj, sess, Some(junos)).await {
        return abort(sess, junos, diags, e).await;
    }
    let (warns, committed) = sess.commit_conf(&commit_message::<T>("create"), junos).await;
    diags.append_warns(warns);
    if let Err(e) = committed {
        return abort(sess, junos, diags, e).await;
    }

    match exists::<T>(obj.name(), sess, junos).await {
        Ok(true) => data.set_id(obj.name()),
        Ok(false) => {
            diags.push_err(Error::NotExistsAfterCommit {
                description: T::DESCRIPTION,
                name: obj.name().to_string(),
            });
            return diags;
        }
        Err(e) => {
            diags.push_err(e);
            return diags;
        }
    }
    info!(resource = T::RESOURCE_TYPE, name = %obj.name(), "Created");

    diags.extend(read_with_session::<T>(data, sess, junos).await);
    diags
}

// ============================================================================
// Read
// ============================================================================

/// Refresh `data` from the device; clears the id when the object is gone
pub async fn read<T: ConfigObject>(sess: &Session, data: &mut ResourceData) -> Diagnostics {
    let junos = match sess.start_new_session().await {
        Ok(junos) => junos,
        Err(e) => return Diagnostics::from_err(e),
    };
    let diags = read_with_session::<T>(data, sess, &junos).await;
    sess.close_session(junos).await;
    diags
}

async fn read_with_session<T: ConfigObject>(
    data: &mut ResourceData,
    sess: &Session,
    junos: &JunosSession,
) -> Diagnostics {
    let name = match data.get_str("name") {
        "" => data.id().to_string(),
        name => name.to_string(),
    };

    let read = {
        let _guard = sess.read_lock().await;
        read_object::<T>(&name, sess, junos).await
    };

    match read {
        Err(e) => Diagnostics::from_err(e),
        Ok(obj) if obj.name().is_empty() => {
            debug!(resource = T::RESOURCE_TYPE, name = %name, "Object not found");
            data.set_id("");
            Diagnostics::new()
        }
        Ok(obj) => match fill_state(data, &obj) {
            Ok(()) => Diagnostics::new(),
            Err(e) => Diagnostics::from_err(e),
        },
    }
}

// ============================================================================
// Update
// ============================================================================

/// Replace the object configuration with `data` (delete then set)
pub async fn update<T: ConfigObject>(sess: &Session, data: &mut ResourceData) -> Diagnostics {
    let obj: T = match from_state(data) {
        Ok(obj) => obj,
        Err(e) => return Diagnostics::from_err(e),
    };

    if sess.fake_update_also() {
        if let Err(e) = delete_object(&obj, sess, None).await {
            return Diagnostics::from_err(e);
        }
        if let Err(e) = set_object(&obj, sess, None).await {
            return Diagnostics::from_err(e);
        }
        return Diagnostics::new();
    }

    let junos = match sess.start_new_session().await {
        Ok(junos) => junos,
        Err(e) => return Diagnostics::from_err(e),
    };
    let diags = update_with_session(&obj, sess, &junos, data).await;
    sess.close_session(junos).await;
    diags
}

async fn update_with_session<T: ConfigObject>(
    obj: &T,
    sess: &Session,
    junos: &JunosSession,
    data: &mut ResourceData,
) -> Diagnostics {
    if let Err(e) = sess.config_lock(junos).await {
        return Diagnostics::from_err(e);
    }

    let mut diags = Diagnostics::new();
    if let Err(e) = delete_object(obj, sess, Some(junos)).await {
        return abort(sess, junos, diags, e).await;
    }
    if let Err(e) = set_object(obj, sess, Some(junos)).await {
        return abort(sess, junos, diags, e).await;
    }
    let (warns, committed) = sess.commit_conf(&commit_message::<T>("update"), junos).await;
    diags.append_warns(warns);
    if let Err(e) = committed {
        return abort(sess, junos, diags, e).await;
    }
    info!(resource = T::RESOURCE_TYPE, name = %obj.name(), "Updated");

    diags.extend(read_with_session::<T>(data, sess, junos).await);
    diags
}

// ============================================================================
// Delete
// ============================================================================

/// Remove the object; clears the id on success
pub async fn delete<T: ConfigObject>(sess: &Session, data: &mut ResourceData) -> Diagnostics {
    let obj: T = match from_state(data) {
        Ok(obj) => obj,
        Err(e) => return Diagnostics::from_err(e),
    };

    if sess.fake_delete_also() {
        if let Err(e) = delete_object(&obj, sess, None).await {
            return Diagnostics::from_err(e);
        }
        data.set_id("");
        return Diagnostics::new();
    }

    let junos = match sess.start_new_session().await {
        Ok(junos) => junos,
        Err(e) => return Diagnostics::from_err(e),
    };
    let diags = delete_with_session(&obj, sess, &junos).await;
    sess.close_session(junos).await;

    if !diags.has_error() {
        data.set_id("");
    }
    diags
}

async fn delete_with_session<T: ConfigObject>(
    obj: &T,
    sess: &Session,
    junos: &JunosSession,
) -> Diagnostics {
    if let Err(e) = sess.config_lock(junos).await {
        return Diagnostics::from_err(e);
    }

    let mut diags = Diagnostics::new();
    if let Err(e) = delete_object(obj, sess, Some(junos)).await {
        return abort(sess, junos, diags, e).await;
    }
    let (warns, committed) = sess.commit_conf(&commit_message::<T>("delete"), junos).await;
    diags.append_warns(warns);
    if let Err(e) = committed {
        return abort(sess, junos, diags, e).await;
    }
    info!(resource = T::RESOURCE_TYPE, name = %obj.name(), "Deleted");

    diags
}

// ============================================================================
// Import
// ============================================================================

/// Build state for an existing object; `id` is the object name
pub async fn import<T: ConfigObject>(sess: &Session, id: &str) -> Result<ResourceData> {
    let junos = sess.start_new_session().await?;
    let result = import_with_session::<T>(id, sess, &junos).await;
    sess.close_session(junos).await;
    result
}

async fn import_with_session<T: ConfigObject>(
    id: &str,
    sess: &Session,
    junos: &JunosSession,
) -> Result<ResourceData> {
    if !exists::<T>(id, sess, junos).await? {
        return Err(Error::NotFoundForImport {
            description: T::DESCRIPTION,
            id: id.to_string(),
        });
    }

    let obj: T = read_object(id, sess, junos).await?;
    let mut data = ResourceData::from_id(id);
    fill_state(&mut data, &obj)?;
    Ok(data)
}
