//! Python bindings for the Mobiledoc builder.

use mobiledoc_core::{
    Error as CoreError, ErrorKind as CoreErrorKind, FileCard, Mobiledoc as CoreMobiledoc,
    TextInput,
};
use pyo3::create_exception;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyString};
use serde_json::{Map, Value};

create_exception!(
    pymobiledoc,
    MobiledocError,
    PyValueError,
    "Raised when a builder call is rejected. The `kind` attribute holds an ErrorKind."
);

// ============================================================================
// Errors
// ============================================================================

/// Builder error category.
#[pyclass(frozen, eq, eq_int, name = "ErrorKind")]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PyErrorKind {
    InvalidArgument,
    MalformedLink,
    UnbalancedMarkup,
}

impl From<CoreErrorKind> for PyErrorKind {
    fn from(k: CoreErrorKind) -> Self {
        match k {
            CoreErrorKind::InvalidArgument => PyErrorKind::InvalidArgument,
            CoreErrorKind::MalformedLink => PyErrorKind::MalformedLink,
            CoreErrorKind::UnbalancedMarkup => PyErrorKind::UnbalancedMarkup,
        }
    }
}

fn to_py_err(py: Python<'_>, e: CoreError) -> PyErr {
    let err = MobiledocError::new_err(e.to_string());
    let value = err.value(py);
    // Attribute errors here would mask the real failure; keep the message.
    let _ = value.setattr("kind", PyErrorKind::from(e.kind()));
    if let Some(span) = e.span() {
        let _ = value.setattr("span", (span.start, span.end));
    }
    err
}

fn invalid_argument(py: Python<'_>, message: String) -> PyErr {
    to_py_err(py, CoreError::invalid_argument(message))
}

// ============================================================================
// Value conversion
// ============================================================================

fn to_json_value(obj: &Bound<'_, PyAny>) -> PyResult<Value> {
    let py = obj.py();
    let text: String = py
        .import("json")?
        .call_method1("dumps", (obj,))
        .map_err(|e| invalid_argument(py, format!("value is not JSON serializable: {}", e)))?
        .extract()?;
    serde_json::from_str(&text).map_err(|e| invalid_argument(py, e.to_string()))
}

fn to_py_object(py: Python<'_>, value: &Value) -> PyResult<PyObject> {
    let obj = py
        .import("json")?
        .call_method1("loads", (value.to_string(),))?;
    Ok(obj.unbind())
}

fn text_input(obj: &Bound<'_, PyAny>) -> PyResult<TextInput> {
    if obj.is_instance_of::<PyString>() {
        return Ok(TextInput::One(obj.extract()?));
    }
    match obj.extract::<Vec<String>>() {
        Ok(texts) => Ok(TextInput::Many(texts)),
        Err(_) => Err(invalid_argument(
            obj.py(),
            format!(
                "text must be a str or a list of str, not {}",
                obj.get_type().name()?
            ),
        )),
    }
}

// ============================================================================
// Document
// ============================================================================

/// A Mobiledoc document under construction.
///
/// Args:
///     version: Format version written to the document (default "0.3.2")
#[pyclass(name = "Mobiledoc")]
pub struct PyMobiledoc {
    inner: CoreMobiledoc,
}

#[pymethods]
impl PyMobiledoc {
    #[new]
    #[pyo3(signature = (version=None), text_signature = "(version=None)")]
    fn new(version: Option<String>) -> Self {
        let inner = match version {
            Some(v) => CoreMobiledoc::with_version(v),
            None => CoreMobiledoc::new(),
        };
        PyMobiledoc { inner }
    }

    /// Append unformatted paragraphs, one per string.
    #[pyo3(text_signature = "(self, text)")]
    fn add_basic_text(&mut self, text: &Bound<'_, PyAny>) -> PyResult<()> {
        self.inner.add_paragraph(text_input(text)?);
        Ok(())
    }

    /// Append paragraphs using inline markup. Raises MobiledocError on
    /// unbalanced delimiters or malformed links; the document is unchanged.
    #[pyo3(text_signature = "(self, text)")]
    fn add_formatted_text(&mut self, py: Python<'_>, text: &Bound<'_, PyAny>) -> PyResult<()> {
        let input = text_input(text)?;
        self.inner
            .add_formatted_paragraph(input)
            .map_err(|e| to_py_err(py, e))
    }

    /// Append a card with an arbitrary name and payload dict.
    #[pyo3(signature = (name, payload=None), text_signature = "(self, name, payload=None)")]
    fn add_card(
        &mut self,
        py: Python<'_>,
        name: &str,
        payload: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<usize> {
        let payload = match payload {
            Some(obj) => match to_json_value(obj)? {
                Value::Object(map) => map,
                _ => return Err(invalid_argument(py, "card payload must be a dict".to_string())),
            },
            None => Map::new(),
        };
        Ok(self.inner.add_card_with(name, payload))
    }

    fn add_divider(&mut self) -> usize {
        self.inner.add_divider()
    }

    #[pyo3(signature = (url, caption=None), text_signature = "(self, url, caption=None)")]
    fn add_image(&mut self, url: &str, caption: Option<&str>) -> usize {
        self.inner.add_image(url, caption)
    }

    #[pyo3(signature = (text, url, alignment=None), text_signature = "(self, text, url, alignment=None)")]
    fn add_button(&mut self, text: &str, url: &str, alignment: Option<&str>) -> usize {
        self.inner.add_button(text, url, alignment)
    }

    fn add_html(&mut self, html: &str) -> usize {
        self.inner.add_html(html)
    }

    fn add_markdown(&mut self, markdown: &str) -> usize {
        self.inner.add_markdown(markdown)
    }

    #[pyo3(
        signature = (url, filename, filetitle, filesize, filecaption=String::new()),
        text_signature = "(self, url, filename, filetitle, filesize, filecaption='')"
    )]
    fn add_file(
        &mut self,
        url: String,
        filename: String,
        filetitle: String,
        filesize: u64,
        filecaption: String,
    ) -> usize {
        let file = FileCard::new(url, filename, filetitle, filesize).with_caption(filecaption);
        self.inner.add_file(file)
    }

    #[pyo3(signature = (text, emoji=None, color=None), text_signature = "(self, text, emoji=None, color=None)")]
    fn add_callout(&mut self, text: &str, emoji: Option<&str>, color: Option<&str>) -> usize {
        self.inner.add_callout(text, emoji, color)
    }

    /// Convert HTML to markdown and append it as a markdown card.
    fn add_markdown_from_html(&mut self, html: &str) -> usize {
        self.inner.add_markdown_from_html(html)
    }

    /// Set a custom top-level value. The value must be JSON serializable.
    #[pyo3(text_signature = "(self, name, value)")]
    fn custom_data(&mut self, py: Python<'_>, name: String, value: &Bound<'_, PyAny>) -> PyResult<()> {
        let value = to_json_value(value)?;
        self.inner
            .set_custom(name, value)
            .map_err(|e| to_py_err(py, e))
    }

    /// The document as a dict.
    fn serialize(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_py_object(py, &self.inner.to_value())
    }

    /// The document as JSON text, compact unless `indent` is given.
    #[pyo3(signature = (indent=None), text_signature = "(self, indent=None)")]
    fn to_json(&self, py: Python<'_>, indent: Option<usize>) -> PyResult<String> {
        let Some(indent) = indent else {
            return Ok(self.inner.to_json());
        };
        let kwargs = PyDict::new(py);
        kwargs.set_item("indent", indent)?;
        py.import("json")?
            .call_method("dumps", (self.serialize(py)?,), Some(&kwargs))?
            .extract()
    }

    fn get_markups(&self, py: Python<'_>) -> PyResult<PyObject> {
        self.part(py, "markups")
    }

    fn get_atoms(&self, py: Python<'_>) -> PyResult<PyObject> {
        self.part(py, "atoms")
    }

    fn get_cards(&self, py: Python<'_>) -> PyResult<PyObject> {
        self.part(py, "cards")
    }

    fn get_sections(&self, py: Python<'_>) -> PyResult<PyObject> {
        self.part(py, "sections")
    }

    fn get_custom(&self, py: Python<'_>) -> PyResult<PyObject> {
        let custom: Map<String, Value> = self
            .inner
            .custom()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        to_py_object(py, &Value::Object(custom))
    }

    #[getter]
    fn version(&self) -> &str {
        self.inner.version()
    }

    fn __len__(&self) -> usize {
        self.inner.sections().len()
    }

    fn __repr__(&self) -> String {
        format!(
            "Mobiledoc(version={:?}, sections={}, markups={}, cards={})",
            self.inner.version(),
            self.inner.sections().len(),
            self.inner.markups().len(),
            self.inner.cards().len()
        )
    }
}

impl PyMobiledoc {
    fn part(&self, py: Python<'_>, key: &str) -> PyResult<PyObject> {
        to_py_object(py, &self.inner.to_value()[key])
    }
}

// ============================================================================
// Module
// ============================================================================

/// Mobiledoc - Build Mobiledoc documents from text, markup and cards.
#[pymodule]
fn pymobiledoc(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyMobiledoc>()?;
    m.add_class::<PyErrorKind>()?;
    m.add("MobiledocError", m.py().get_type::<MobiledocError>())?;
    m.add("MOBILEDOC_VERSION", mobiledoc_core::MOBILEDOC_VERSION)?;
    Ok(())
}
