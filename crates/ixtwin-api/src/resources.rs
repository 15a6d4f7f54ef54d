// Resource file endpoints
//
// Listing and uploading the files that topology configs and RIB
// comparisons refer to by name.

use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::client::TwinClient;
use crate::error::Error;
use crate::models::{
    ResourceEntry, ResourceFilesResponse, RibDumpsResponse, UploadFile, UploadResponse,
};

impl TwinClient {
    /// List files and directories in the backend's resource directory.
    ///
    /// `GET /resources/files`
    pub async fn list_resource_files(&self) -> Result<Vec<ResourceEntry>, Error> {
        let resp: ResourceFilesResponse = self.get("resources/files").await?;
        Ok(resp.files)
    }

    /// List the RIB dump file names referenced by the backend settings.
    ///
    /// `GET /resources/rib-dumps`
    pub async fn list_rib_dumps(&self) -> Result<Vec<String>, Error> {
        let resp: RibDumpsResponse = self.get("resources/rib-dumps").await?;
        Ok(resp.rib_dumps)
    }

    /// Upload a single file into the resource directory.
    ///
    /// `POST /resources/upload`
    pub async fn upload_resource_file(&self, file: UploadFile) -> Result<UploadResponse, Error> {
        debug!(file = %file.file_name, bytes = file.contents.len(), "uploading resource file");
        let form = Form::new().part("file", file_part(file));
        self.post_multipart("resources/upload", form).await
    }

    /// Upload a directory. Each file's name carries its path relative to
    /// the directory's parent, so the first segment names the directory.
    ///
    /// `POST /resources/upload-directory`
    pub async fn upload_resource_directory(
        &self,
        files: Vec<UploadFile>,
    ) -> Result<UploadResponse, Error> {
        debug!(count = files.len(), "uploading resource directory");
        let form = files
            .into_iter()
            .fold(Form::new(), |form, file| form.part("files", file_part(file)));
        self.post_multipart("resources/upload-directory", form).await
    }
}

fn file_part(file: UploadFile) -> Part {
    Part::bytes(file.contents.to_vec()).file_name(file.file_name)
}
