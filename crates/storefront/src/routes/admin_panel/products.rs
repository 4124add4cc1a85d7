//! Admin product management: list, create, edit, delete.
//!
//! Create and edit take `multipart/form-data` so the display image and the
//! customiser template can be uploaded with the text fields.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    response::{IntoResponse, Redirect, Response},
};
use tracing::instrument;

use printshop_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{PageContext, RequireStaff};
use crate::models::{Product, ProductInput};
use crate::services::admin::ProductForm;
use crate::services::form::FieldErrors;
use crate::services::media::{MediaCategory, png_dimensions, upload_extension};
use crate::state::AppState;

const PRODUCTS_PATH: &str = "/admin-panel/products/";

/// Product list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products_list.html")]
pub struct ProductsListTemplate {
    pub ctx: PageContext,
    pub products: Vec<Product>,
}

/// Create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products_form.html")]
pub struct ProductFormTemplate {
    pub ctx: PageContext,
    pub title: String,
    pub action: String,
    pub form: ProductForm,
    pub errors: FieldErrors,
    /// The product being edited, for showing its current images.
    pub product: Option<Product>,
}

/// Delete confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub ctx: PageContext,
    pub title: String,
    pub message: String,
    pub cancel_url: String,
}

/// An uploaded file.
#[derive(Debug)]
struct Upload {
    file_name: String,
    bytes: Bytes,
}

/// Everything posted by the product form.
#[derive(Debug, Default)]
struct ProductSubmission {
    form: ProductForm,
    image: Option<Upload>,
    template_image: Option<Upload>,
}

/// List all products, newest first.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    ctx: PageContext,
) -> Result<impl IntoResponse> {
    let products = ProductRepository::new(state.pool()).list_newest(None).await?;
    Ok(ProductsListTemplate { ctx, products })
}

/// Display the create form.
pub async fn create_page(RequireStaff(_staff): RequireStaff, ctx: PageContext) -> impl IntoResponse {
    form_page(ctx, None, ProductForm::for_create(), FieldErrors::default())
}

/// Handle the create form.
#[instrument(skip_all, fields(staff_id = %staff.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    ctx: PageContext,
    multipart: Multipart,
) -> Result<Response> {
    let submission = read_submission(multipart).await?;
    let form = submission.form.clone();

    match apply_submission(&state, None, submission).await? {
        Ok(input) => {
            let product = ProductRepository::new(state.pool()).create(&input).await?;
            tracing::info!(product_id = %product.id, "Product created");
            Ok(Redirect::to(PRODUCTS_PATH).into_response())
        }
        Err(errors) => Ok(form_page(ctx, None, form, errors).into_response()),
    }
}

/// Display the edit form.
#[instrument(skip(state, _staff, ctx))]
pub async fn edit_page(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    ctx: PageContext,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = find_product(&state, id).await?;
    let form = ProductForm::from_product(&product);
    Ok(form_page(ctx, Some(product), form, FieldErrors::default()))
}

/// Handle the edit form. Images not re-uploaded are kept.
#[instrument(skip(state, staff, ctx, multipart), fields(staff_id = %staff.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    ctx: PageContext,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Response> {
    let product = find_product(&state, id).await?;
    let submission = read_submission(multipart).await?;
    let form = submission.form.clone();

    match apply_submission(&state, Some(&product), submission).await? {
        Ok(input) => {
            ProductRepository::new(state.pool()).update(id, &input).await?;
            tracing::info!(product_id = %id, "Product updated");
            Ok(Redirect::to(PRODUCTS_PATH).into_response())
        }
        Err(errors) => Ok(form_page(ctx, Some(product), form, errors).into_response()),
    }
}

/// Ask before deleting.
#[instrument(skip(state, _staff, ctx))]
pub async fn confirm_delete(
    State(state): State<AppState>,
    RequireStaff(_staff): RequireStaff,
    ctx: PageContext,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = find_product(&state, id).await?;

    Ok(ConfirmDeleteTemplate {
        ctx,
        title: "Delete product".to_string(),
        message: format!("Are you sure you want to delete '{}'?", product.name),
        cancel_url: PRODUCTS_PATH.to_string(),
    })
}

/// Delete a product.
#[instrument(skip(state, staff), fields(staff_id = %staff.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireStaff(staff): RequireStaff,
    Path(id): Path<ProductId>,
) -> Result<Redirect> {
    if !ProductRepository::new(state.pool()).delete(id).await? {
        return Err(AppError::NotFound(format!("product {id}")));
    }

    tracing::info!(product_id = %id, "Product deleted");
    Ok(Redirect::to(PRODUCTS_PATH))
}

fn form_page(
    ctx: PageContext,
    product: Option<Product>,
    form: ProductForm,
    errors: FieldErrors,
) -> ProductFormTemplate {
    let (title, action) = match &product {
        Some(p) => (
            format!("Edit {}", p.name),
            format!("{PRODUCTS_PATH}{}/edit/", p.id),
        ),
        None => ("New product".to_string(), format!("{PRODUCTS_PATH}create/")),
    };

    ProductFormTemplate {
        ctx,
        title,
        action,
        form,
        errors,
        product,
    }
}

async fn find_product(state: &AppState, id: ProductId) -> Result<Product> {
    ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Collect text fields and file uploads. Empty file inputs are skipped.
async fn read_submission(mut multipart: Multipart) -> Result<ProductSubmission> {
    let mut submission = ProductSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "image" || name == "template_image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            if file_name.is_empty() && bytes.is_empty() {
                continue;
            }

            let upload = Some(Upload { file_name, bytes });
            if name == "image" {
                submission.image = upload;
            } else {
                submission.template_image = upload;
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            submission.form.set(&name, value);
        }
    }

    Ok(submission)
}

/// Validate a submission and store its uploads.
///
/// Files are only written once every field is valid. The outer `Result`
/// carries storage failures, the inner one form errors.
async fn apply_submission(
    state: &AppState,
    existing: Option<&Product>,
    submission: ProductSubmission,
) -> Result<std::result::Result<ProductInput, FieldErrors>> {
    let mut errors = FieldErrors::default();

    let image_ext = check_upload(&mut errors, "image", submission.image.as_ref());
    let template_ext = check_upload(
        &mut errors,
        "template_image",
        submission.template_image.as_ref(),
    );

    // A new template replaces the known size; a non-PNG one has no readable size.
    let template_size = match &submission.template_image {
        Some(upload) => png_dimensions(&upload.bytes),
        None => existing.and_then(|p| p.template_size),
    };

    let fields = match submission.form.validate(existing, template_size) {
        Ok(fields) => Some(fields),
        Err(form_errors) => {
            errors.merge(form_errors);
            None
        }
    };

    let Some(fields) = fields.filter(|_| errors.is_empty()) else {
        return Ok(Err(errors));
    };

    let media = state.media();
    let image = match (submission.image, image_ext) {
        (Some(upload), Some(ext)) => Some(media.store(MediaCategory::Products, ext, &upload.bytes).await?),
        _ => existing.and_then(|p| p.image.clone()),
    };
    let template_image = match (submission.template_image, template_ext) {
        (Some(upload), Some(ext)) => {
            Some(media.store(MediaCategory::Templates, ext, &upload.bytes).await?)
        }
        _ => existing.and_then(|p| p.template_image.clone()),
    };

    Ok(Ok(ProductInput {
        name: fields.name,
        price: fields.price,
        description: fields.description,
        image,
        template_image,
        template_size,
        print_area: fields.print_area,
    }))
}

fn check_upload(
    errors: &mut FieldErrors,
    field: &'static str,
    upload: Option<&Upload>,
) -> Option<&'static str> {
    let upload = upload?;
    if upload.bytes.is_empty() {
        errors.add(field, "The submitted file is empty.");
        return None;
    }
    match upload_extension(&upload.file_name) {
        Ok(ext) => Some(ext),
        Err(_) => {
            errors.add(
                field,
                "Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
            );
            None
        }
    }
}
