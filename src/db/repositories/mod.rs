mod attendance;
mod subjects;
