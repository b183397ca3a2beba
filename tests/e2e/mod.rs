// End-to-end tests for the Hebrew TTS Backend API
//
// Each test starts the real router on an ephemeral port. The ONNX models and
// ffmpeg are replaced by in-memory fakes behind the repository traits, so the
// suite runs without model files or external binaries.

mod helpers;
mod test_auth;
mod test_health;
mod test_web;
